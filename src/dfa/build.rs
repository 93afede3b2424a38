//! Builds a [`Dfa`] by exploring the joint derivative of a priority-ordered
//! pattern list breadth-first, then pruning and compressing the result.

use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::dfa::{Dfa, State, StateId, Transition};
use crate::error::LexerError;
use crate::partition::Partition;
use crate::regex::Regex;
use crate::vector::Vector;

/// A tag-conflict resolver: given the (non-empty, priority-ordered) tag ids
/// nullable at some reachable state and the pattern names they came from,
/// decides what name that state accepts under, or refuses.
pub type Resolve = dyn Fn(&[u32], &[String]) -> Result<String, LexerError>;

/// Always accepts the earliest-priority pattern among the conflicting set.
pub fn select_first(tags: &[u32], names: &[String]) -> Result<String, LexerError> {
    Ok(names[tags[0] as usize].clone())
}

/// The default resolver: accepts a single unambiguous tag, and fails with
/// [`LexerError::ConflictingPatterns`] the moment more than one pattern can
/// accept at the same reachable state.
pub fn raise_on_conflict(tags: &[u32], names: &[String]) -> Result<String, LexerError> {
    if let [only] = tags {
        Ok(names[*only as usize].clone())
    } else {
        let offending = tags.iter().map(|&id| names[id as usize].clone()).collect();
        Err(LexerError::ConflictingPatterns(offending))
    }
}

/// Builds a [`Dfa`] that performs maximal-munch tokenisation over
/// `patterns`, in priority order (earlier patterns win ties under the stock
/// resolvers above). Patterns whose regex can never match anything are kept
/// only for naming purposes and never contribute a reachable state.
pub fn make_lexer<S: Into<String>>(
    patterns: Vec<(S, Regex)>,
    resolve: &Resolve,
) -> Result<Dfa, LexerError> {
    let mut names = Vec::with_capacity(patterns.len());
    let mut items = Vec::with_capacity(patterns.len());
    for (id, (name, regex)) in patterns.into_iter().enumerate() {
        names.push(name.into());
        if !regex.is_empty() {
            items.push((id as u32, regex));
        }
    }

    let start = Vector::new(items);
    let (vectors, raw_edges) = explore(start);
    debug!("explored {} candidate states", vectors.len());
    build_dfa(vectors, raw_edges, names, resolve)
}

/// Breadth-first exploration of the joint derivative, interning vectors as
/// they're discovered. Returns the discovered states in discovery order
/// (state `0` is always the start) together with each one's raw outgoing
/// partition, indices into the same list (or `None` for a dead successor).
fn explore(start: Vector) -> (Vec<Vector>, Vec<Partition<Option<StateId>>>) {
    let mut index: HashMap<Vector, StateId> = HashMap::new();
    let mut states = Vec::new();
    let mut queue: VecDeque<StateId> = VecDeque::new();

    index.insert(start.clone(), 0);
    states.push(start);
    queue.push_back(0);

    let mut raw_edges = Vec::new();
    while let Some(state_id) = queue.pop_front() {
        let vector = states[state_id].clone();
        let edges = vector.derivatives().map(|target| {
            if target.is_dead() {
                None
            } else if let Some(&id) = index.get(&target) {
                Some(id)
            } else {
                let id = states.len();
                index.insert(target.clone(), id);
                states.push(target);
                queue.push_back(id);
                Some(id)
            }
        });
        raw_edges.push(edges);
    }

    (states, raw_edges)
}

/// Resolves tag conflicts, prunes unreachable-to-an-accept states, renumbers
/// the survivors densely, and compresses transitions.
fn build_dfa(
    vectors: Vec<Vector>,
    raw_edges: Vec<Partition<Option<StateId>>>,
    names: Vec<String>,
    resolve: &Resolve,
) -> Result<Dfa, LexerError> {
    let n = vectors.len();

    let own_tags: Vec<Vec<u32>> = vectors.iter().map(Vector::tags).collect();
    let mut own_name: Vec<Option<String>> = Vec::with_capacity(n);
    for tags in &own_tags {
        own_name.push(if tags.is_empty() { None } else { Some(resolve(tags, &names)?) });
    }

    let live = liveness(&own_tags, &raw_edges);

    let mut new_id: Vec<Option<StateId>> = vec![None; n];
    let mut next_id = 0;
    for i in 0..n {
        if live[i] {
            new_id[i] = Some(next_id);
            next_id += 1;
        }
    }

    let mut tag_names: Vec<String> = own_name.iter().flatten().cloned().collect();
    tag_names.sort();
    tag_names.dedup();
    let tag_id = |name: &str| -> u32 {
        tag_names.binary_search_by(|n| n.as_str().cmp(name)).expect("every own_name is in tag_names") as u32
    };

    let mut out_states = Vec::with_capacity(next_id);
    for i in 0..n {
        if !live[i] {
            continue;
        }

        let mut bands: Vec<(u32, Transition)> = Vec::with_capacity(raw_edges[i].bands().len());
        for &(bound, target) in raw_edges[i].bands() {
            let (resolved_target, tag) = match target {
                Some(t) if live[t] => (new_id[t], own_name[t].as_deref().map(tag_id)),
                _ => (None, None),
            };
            bands.push((bound, Transition { upper_bound: bound, target: resolved_target, tag, at_exit: false }));
        }
        let transitions = compress(bands);

        // `lookahead` describes genuine trailing context (a pattern whose
        // accept depends on the *next* character, disambiguated by some
        // construct not yet exposed by the builder façade): it must not be
        // derived from "this state accepts but a longer match may still
        // follow", since that is the ordinary, non-lookahead case every
        // `x*`/`x+` tail state hits. With no trailing-context construct to
        // produce it, no state is ever a lookahead state today; `entry_tag`
        // always reflects this state's own accept, including the start
        // state, which has no incoming transition to record it otherwise.
        let own = own_name[i].as_deref().map(tag_id);

        out_states.push(State { transitions, entry_tag: own, eof_tag: own, lookahead: false });
    }

    Ok(Dfa { states: out_states, tag_names })
}

/// A state is live iff it can reach a tagging state (including itself); the
/// start state is always kept live even if no pattern can ever match, so a
/// built `Dfa` always has at least one state.
fn liveness(own_tags: &[Vec<u32>], raw_edges: &[Partition<Option<StateId>>]) -> Vec<bool> {
    let n = own_tags.len();
    let mut reverse: Vec<Vec<StateId>> = vec![Vec::new(); n];
    for (from, edges) in raw_edges.iter().enumerate() {
        for &(_, target) in edges.bands() {
            if let Some(to) = target {
                reverse[to].push(from);
            }
        }
    }

    let mut live = vec![false; n];
    let mut queue: VecDeque<StateId> = VecDeque::new();
    for (i, tags) in own_tags.iter().enumerate() {
        if !tags.is_empty() {
            live[i] = true;
            queue.push_back(i);
        }
    }
    if !live[0] {
        live[0] = true;
        queue.push_back(0);
    }

    while let Some(s) = queue.pop_front() {
        for &pred in &reverse[s] {
            if !live[pred] {
                live[pred] = true;
                queue.push_back(pred);
            }
        }
    }
    live
}

/// Coalesces adjacent bands that agree on target, tag and at_exit — a
/// transition compression pass distinct from [`Partition`]'s own coalescing,
/// since two raw bands that pointed at different (pre-pruning) states can
/// become equal once dead or unreachable targets are rewritten to `None`.
fn compress(bands: Vec<(u32, Transition)>) -> Vec<Transition> {
    let mut out: Vec<Transition> = Vec::with_capacity(bands.len());
    for (bound, mut t) in bands {
        t.upper_bound = bound;
        let same_as_last = matches!(
            out.last(),
            Some(prev) if prev.target == t.target && prev.tag == t.tag && prev.at_exit == t.at_exit
        );
        if same_as_last {
            out.last_mut().unwrap().upper_bound = bound;
        } else {
            out.push(t);
        }
    }
    out
}

/// An alternative build step: Moore-style partition refinement.
///
/// States start grouped by their accept fingerprint (`entry_tag`, `eof_tag`,
/// `lookahead`), then are repeatedly split by where their transitions lead
/// *in terms of the previous round's groups* until a fixpoint — each round
/// reads the prior assignment and writes a fresh one, so (unlike a naive
/// worklist that mutates the partition it's iterating over) a group can
/// never be split against its own still-in-progress refinement.
pub fn minimize(dfa: &Dfa) -> Dfa {
    let n = dfa.state_count();
    if n == 0 {
        return dfa.clone();
    }

    let mut group_of: Vec<usize> = {
        let mut seen = HashMap::new();
        dfa.iter_states()
            .map(|s| {
                let key = (s.entry_tag, s.eof_tag, s.lookahead);
                let next = seen.len();
                *seen.entry(key).or_insert(next)
            })
            .collect()
    };

    loop {
        let mut seen: HashMap<(usize, Vec<(u32, Option<usize>, Option<u32>, bool)>), usize> = HashMap::new();
        let mut new_group_of = Vec::with_capacity(n);
        for (i, state) in dfa.iter_states().enumerate() {
            let signature: Vec<_> = state
                .transitions
                .iter()
                .map(|t| (t.upper_bound, t.target.map(|to| group_of[to]), t.tag, t.at_exit))
                .collect();
            let key = (group_of[i], signature);
            let next = seen.len();
            new_group_of.push(*seen.entry(key).or_insert(next));
        }
        if new_group_of == group_of {
            break;
        }
        group_of = new_group_of;
    }

    let group_count = group_of.iter().copied().max().unwrap() + 1;
    let mut representative = vec![usize::MAX; group_count];
    for (i, &g) in group_of.iter().enumerate() {
        if representative[g] == usize::MAX {
            representative[g] = i;
        }
    }

    // Keep the start state's group at index 0.
    let start_group = group_of[0];
    let mut remap = vec![0usize; group_count];
    let mut next = 1;
    for g in 0..group_count {
        remap[g] = if g == start_group {
            0
        } else {
            let id = next;
            next += 1;
            id
        };
    }

    let mut states: Vec<Option<State>> = vec![None; group_count];
    for (g, &rep) in representative.iter().enumerate() {
        let original = dfa.state(rep);
        let transitions = original
            .transitions
            .iter()
            .map(|t| Transition {
                upper_bound: t.upper_bound,
                target: t.target.map(|to| remap[group_of[to]]),
                tag: t.tag,
                at_exit: t.at_exit,
            })
            .collect();
        states[remap[g]] = Some(State {
            transitions,
            entry_tag: original.entry_tag,
            eof_tag: original.eof_tag,
            lookahead: original.lookahead,
        });
    }

    Dfa {
        states: states.into_iter().map(|s| s.expect("every group has a representative")).collect(),
        tag_names: dfa.tag_names.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;

    fn lex(patterns: Vec<(&str, Regex)>) -> Result<Dfa, LexerError> {
        make_lexer(patterns, &raise_on_conflict)
    }

    #[test]
    fn empty_pattern_list_has_a_start_state_and_never_matches() {
        let dfa = lex(vec![]).unwrap();
        assert_eq!(dfa.state_count(), 1);
        assert!(dfa.state(0).entry_tag.is_none());
        assert!(dfa.state(0).eof_tag.is_none());
    }

    #[test]
    fn keyword_beats_identifier_by_priority() {
        let dfa = lex(vec![
            ("if", builder::string("if")),
            ("ident", builder::char_set("a-z").unwrap().plus()),
        ])
        .unwrap();
        let m = dfa.scan_once(b"if").unwrap();
        assert_eq!(m.tag, "if");
        assert_eq!(m.length, 2);

        let m = dfa.scan_once(b"iffy").unwrap();
        assert_eq!(m.tag, "ident");
        assert_eq!(m.length, 4);
    }

    #[test]
    fn conflicting_patterns_are_rejected_by_default() {
        let err = lex(vec![("a", builder::string("x")), ("b", builder::string("x"))]).unwrap_err();
        match err {
            LexerError::ConflictingPatterns(names) => {
                assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
            }
        }
    }

    #[test]
    fn select_first_resolves_the_same_conflict() {
        let dfa = make_lexer(
            vec![("a", builder::string("x")), ("b", builder::string("x"))],
            &select_first,
        )
        .unwrap();
        assert_eq!(dfa.scan_once(b"x").unwrap().tag, "a");
    }

    #[test]
    fn minimize_is_idempotent() {
        let dfa = lex(vec![
            ("a", builder::string("aa")),
            ("b", builder::string("ba")),
        ])
        .unwrap();
        let once = minimize(&dfa);
        let twice = minimize(&once);
        assert_eq!(once.state_count(), twice.state_count());
    }
}
