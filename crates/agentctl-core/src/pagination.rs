//! Cursor-based paging decisions.

use serde_json::Value;

use crate::binding::{BoundRequest, RawInputs};
use crate::descriptor::{OperationDescriptor, Pagination};
use crate::projection::Selector;

/// How many pages one invocation fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingMode {
    /// Follow cursors until the service stops returning one
    Auto,
    /// Fetch one page and hand the cursor back to the caller
    Single,
}

/// The caller drives paging when they disabled auto-iteration, passed a
/// cursor themselves, or asked for whole responses.
pub fn mode(
    op: &OperationDescriptor,
    raw: &RawInputs,
    selector: &Selector,
    auto_iterate: bool,
) -> PagingMode {
    let Some(paging) = op.pagination else {
        return PagingMode::Single;
    };

    let explicit_cursor = op
        .input(paging.input_token)
        .is_some_and(|field| raw.contains(field));

    // `*` and `^param` read nothing from later pages.
    if !auto_iterate || explicit_cursor || selector.is_whole() || selector.is_param() {
        PagingMode::Single
    } else {
        PagingMode::Auto
    }
}

/// Next cursor from a response, `None` when absent or empty.
pub fn next_cursor(paging: &Pagination, response: &Value) -> Option<String> {
    response
        .get(paging.output_token)
        .and_then(Value::as_str)
        .filter(|cursor| !cursor.is_empty())
        .map(str::to_string)
}

/// True when `cursor` is the one the request just sent.
pub fn is_stalled(paging: &Pagination, request: &BoundRequest, cursor: &str) -> bool {
    request
        .get(paging.input_token)
        .and_then(Value::as_str)
        .is_some_and(|sent| sent == cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::bind;
    use crate::registry::find;
    use serde_json::json;

    #[test]
    fn test_mode_selection() {
        let op = find("get-agent-runtime-list").unwrap();
        let items = Selector::default_for(op).unwrap();
        let none = RawInputs::new();

        assert_eq!(mode(op, &none, &items, true), PagingMode::Auto);
        assert_eq!(mode(op, &none, &items, false), PagingMode::Single);
        assert_eq!(mode(op, &none, &Selector::Whole, true), PagingMode::Single);
        let param = Selector::parse(op, "^maxResults").unwrap();
        assert_eq!(mode(op, &none, &param, true), PagingMode::Single);

        let resumed = RawInputs::new().with("next-token", "abc");
        assert_eq!(mode(op, &resumed, &items, true), PagingMode::Single);

        let get = find("get-agent-runtime").unwrap();
        assert_eq!(mode(get, &none, &Selector::Whole, true), PagingMode::Single);
    }

    #[test]
    fn test_next_cursor_and_stall() {
        let op = find("get-memory-list").unwrap();
        let paging = op.pagination.unwrap();

        assert_eq!(next_cursor(&paging, &json!({"nextToken": "p2"})), Some("p2".into()));
        assert_eq!(next_cursor(&paging, &json!({"nextToken": ""})), None);
        assert_eq!(next_cursor(&paging, &json!({"memories": []})), None);

        let request = bind(op, &RawInputs::new().with("nextToken", "p2")).unwrap();
        assert!(is_stalled(&paging, &request, "p2"));
        assert!(!is_stalled(&paging, &request, "p3"));
    }
}
