//! Emitters that turn a built [`crate::dfa::Dfa`] into an external
//! artifact. Both are pure presentation layers over the DFA's
//! [`crate::dfa::Dfa::iter_states`]/[`crate::dfa::Dfa::get_tags`]
//! introspection — neither adds to nor changes scanning semantics.

pub mod c;
pub mod dot;
