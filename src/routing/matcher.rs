//! Trie descent.
//!
//! # Algorithm
//! Depth-first with backtracking, driven by an explicit stack. At each node
//! the current segment is offered, in order, to:
//! 1. the static child with that literal
//! 2. the parameter edge, when its constraint accepts the segment
//! 3. the wildcard child, which swallows every remaining segment
//!
//! Static and parameter results compete on priority (ties keep the static
//! result). The wildcard is only tried when neither produced a match, and
//! its result is taken as is.
//!
//! # Design Decisions
//! - Best-first among the candidates of each node, not a global optimum
//! - Cost grows with path depth and branching, never with route count

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::routing::compiler::{split_path, CompiledRoute};
use crate::routing::method::HttpMethod;
use crate::routing::route::Route;
use crate::routing::segment::WILDCARD_PARAM;
use crate::routing::trie::{NodeId, RouteTrie};

/// A resolved route and the parameters bound while reaching it.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    pub params: HashMap<String, String>,
    priority: u64,
}

impl RouteMatch {
    fn new(compiled: &CompiledRoute, bound: &[(&str, Cow<'_, str>)]) -> Self {
        Self {
            route: Arc::clone(&compiled.route),
            params: bound
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            priority: compiled.priority,
        }
    }

    /// Specificity of the winning route.
    pub fn priority(&self) -> u64 {
        self.priority
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Static,
    Param,
    Wildcard,
    Done,
}

struct Frame {
    node: NodeId,
    depth: usize,
    stage: Stage,
    /// Whether entering this frame pushed a binding.
    binds: bool,
    best: Option<RouteMatch>,
}

impl Frame {
    fn new(node: NodeId, depth: usize, binds: bool) -> Self {
        Self {
            node,
            depth,
            stage: Stage::Static,
            binds,
            best: None,
        }
    }

    fn offer(&mut self, candidate: Option<RouteMatch>) {
        let Some(candidate) = candidate else { return };
        match &self.best {
            Some(best) if best.priority >= candidate.priority => {}
            _ => self.best = Some(candidate),
        }
    }
}

/// Resolve `path` for `method` against `trie`.
pub fn find(trie: &RouteTrie, path: &str, method: HttpMethod) -> Option<RouteMatch> {
    let segments: Vec<&str> = split_path(path).collect();
    find_segments(trie, &segments, method)
}

/// Resolve pre-split path segments for `method` against `trie`.
pub fn find_segments(
    trie: &RouteTrie,
    segments: &[&str],
    method: HttpMethod,
) -> Option<RouteMatch> {
    let mut bound: Vec<(&str, Cow<'_, str>)> = Vec::new();
    let mut stack = vec![Frame::new(NodeId::ROOT, 0, false)];

    while let Some(frame) = stack.last_mut() {
        let node = trie.node(frame.node);

        if frame.depth == segments.len() {
            let result = node.route(method).map(|c| RouteMatch::new(c, &bound));
            if let Some(done) = complete(&mut stack, &mut bound, result) {
                return done;
            }
            continue;
        }

        let segment = segments[frame.depth];
        match frame.stage {
            Stage::Static => {
                frame.stage = Stage::Param;
                if let Some(child) = node.static_child(segment) {
                    let depth = frame.depth + 1;
                    stack.push(Frame::new(child, depth, false));
                }
            }
            Stage::Param => {
                frame.stage = Stage::Wildcard;
                if let Some(edge) = node.param_edge().filter(|e| e.accepts(segment)) {
                    let depth = frame.depth + 1;
                    bound.push((edge.name.as_str(), Cow::Borrowed(segment)));
                    stack.push(Frame::new(edge.node, depth, true));
                }
            }
            Stage::Wildcard => {
                frame.stage = Stage::Done;
                if frame.best.is_none() {
                    if let Some(child) = node.wildcard_child() {
                        let rest = segments[frame.depth..].join("/");
                        bound.push((WILDCARD_PARAM, Cow::Owned(rest)));
                        stack.push(Frame::new(child, segments.len(), true));
                    }
                }
            }
            Stage::Done => {
                let result = frame.best.take();
                if let Some(done) = complete(&mut stack, &mut bound, result) {
                    return done;
                }
            }
        }
    }

    None
}

/// Pop the top frame and hand its result to the parent.
///
/// Returns `Some` with the final answer once the root frame is popped.
fn complete(
    stack: &mut Vec<Frame>,
    bound: &mut Vec<(&str, Cow<'_, str>)>,
    result: Option<RouteMatch>,
) -> Option<Option<RouteMatch>> {
    if let Some(frame) = stack.pop() {
        if frame.binds {
            bound.pop();
        }
    }
    match stack.last_mut() {
        Some(parent) => {
            parent.offer(result);
            None
        }
        None => Some(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::compiler::RouteCompiler;
    use crate::routing::handler::{HandlerRef, HandlerResponse};

    struct Fixture {
        compiler: RouteCompiler,
        trie: RouteTrie,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                compiler: RouteCompiler::new(),
                trie: RouteTrie::new(),
            }
        }

        fn add(&mut self, method: HttpMethod, path: &str) -> &mut Self {
            let handler = HandlerRef::from_fn(|_| HandlerResponse::text(200, ""));
            let compiled = self
                .compiler
                .compile(Route::new(method, path, handler).with_name(path))
                .unwrap();
            self.trie.insert(&compiled);
            self
        }

        fn get(&self, path: &str) -> Option<RouteMatch> {
            find(&self.trie, path, HttpMethod::Get)
        }

        fn get_name(&self, path: &str) -> Option<String> {
            self.get(path).and_then(|m| m.route.name.clone())
        }
    }

    #[test]
    fn test_static_match_has_no_params() {
        let mut f = Fixture::new();
        f.add(HttpMethod::Get, "/health");
        let m = f.get("/health").unwrap();
        assert!(m.params.is_empty());
        assert!(f.get("/healthz").is_none());
    }

    #[test]
    fn test_root_route() {
        let mut f = Fixture::new();
        f.add(HttpMethod::Get, "/");
        assert!(f.get("/").is_some());
        assert!(f.get("").is_some());
        assert!(f.get("/x").is_none());
    }

    #[test]
    fn test_method_filter_at_terminal() {
        let mut f = Fixture::new();
        f.add(HttpMethod::Post, "/items");
        assert!(f.get("/items").is_none());
        assert!(find(&f.trie, "/items", HttpMethod::Post).is_some());
    }

    #[test]
    fn test_static_beats_parameter() {
        let mut f = Fixture::new();
        f.add(HttpMethod::Get, "/users/{id}").add(HttpMethod::Get, "/users/active");
        assert_eq!(f.get_name("/users/active").as_deref(), Some("/users/active"));
        let m = f.get("/users/9").unwrap();
        assert_eq!(m.params["id"], "9");
    }

    #[test]
    fn test_constraint_rejects_segment() {
        let mut f = Fixture::new();
        f.add(HttpMethod::Get, r"/orders/{id:\d+}");
        assert!(f.get("/orders/12").is_some());
        assert!(f.get("/orders/twelve").is_none());
    }

    #[test]
    fn test_backtracks_out_of_dead_static_branch() {
        let mut f = Fixture::new();
        f.add(HttpMethod::Get, "/a/b/c").add(HttpMethod::Get, "/a/{x}/d");
        let m = f.get("/a/b/d").unwrap();
        assert_eq!(m.params["x"], "b");
        assert_eq!(m.params.len(), 1);
    }

    #[test]
    fn test_higher_priority_parameter_branch_wins() {
        let mut f = Fixture::new();
        // 3000 + 20 + 10
        f.add(HttpMethod::Get, "/1/{p}/{q}");
        // 300 + 2000 + 1000
        f.add(HttpMethod::Get, r"/{a:\d+}/b/c");
        let m = f.get("/1/b/c").unwrap();
        assert_eq!(m.route.name.as_deref(), Some(r"/{a:\d+}/b/c"));
        assert_eq!(m.priority(), 3300);
        assert_eq!(m.params["a"], "1");
    }

    #[test]
    fn test_wildcard_captures_remainder() {
        let mut f = Fixture::new();
        f.add(HttpMethod::Get, "/files/*");
        let m = f.get("/files/a/b/c").unwrap();
        assert_eq!(m.params["wildcard"], "a/b/c");
        assert!(f.get("/files").is_none());
    }

    #[test]
    fn test_wildcard_is_a_fallback() {
        let mut f = Fixture::new();
        f.add(HttpMethod::Get, "/assets/*")
            .add(HttpMethod::Get, "/assets/logo.png")
            .add(HttpMethod::Get, "/assets/{name}/meta");

        assert_eq!(f.get_name("/assets/logo.png").as_deref(), Some("/assets/logo.png"));
        assert_eq!(f.get_name("/assets/x/meta").as_deref(), Some("/assets/{name}/meta"));

        let m = f.get("/assets/x/other").unwrap();
        assert_eq!(m.route.name.as_deref(), Some("/assets/*"));
        assert_eq!(m.params.len(), 1);
        assert_eq!(m.params["wildcard"], "x/other");
    }

    #[test]
    fn test_nested_wildcard_binds_with_params() {
        let mut f = Fixture::new();
        f.add(HttpMethod::Get, "/repo/{owner}/blob/*");
        let m = f.get("/repo/rust-lang/blob/src/lib.rs").unwrap();
        assert_eq!(m.params["owner"], "rust-lang");
        assert_eq!(m.params["wildcard"], "src/lib.rs");
    }

    #[test]
    fn test_mixed_segment_binds_whole_segment_to_first_name() {
        let mut f = Fixture::new();
        f.add(HttpMethod::Get, r"/range/{from}-{to:\d+}");
        let m = f.get("/range/a-10").unwrap();
        assert_eq!(m.params.len(), 1);
        assert_eq!(m.params["from"], "a-10");
        assert!(!m.params.contains_key("to"));
        assert!(f.get("/range/a-b").is_none());
    }

    #[test]
    fn test_deep_path_does_not_recurse() {
        let mut f = Fixture::new();
        let pattern = "/{p}".repeat(2_000);
        f.add(HttpMethod::Get, &pattern);
        let path = "/v".repeat(2_000);
        let m = f.get(&path).unwrap();
        assert_eq!(m.params["p"], "v");
    }
}
