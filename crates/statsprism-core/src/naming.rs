//! Metric name composition.
//!
//! Names are dot-joined paths. Empty parts are dropped so optional segments
//! (no global prefix, no ajax marker) never produce `a..b`.

/// Separator tokens accepted for tag-like naming.
pub const TAGS_LIKE_SUPPORTED: [&str; 2] = ["=", "_is_"];

/// How request dimensions are rendered into the metric path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagStyle {
    /// `get.pkg.views.index`
    #[default]
    Off,
    /// `method=get.view=pkg_views_index.is_ajax=false`
    Equals,
    /// `method_is_get.view_is_pkg_views_index.is_ajax_is_false`
    Is,
}

impl TagStyle {
    /// Parse a separator token. Unknown tokens yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" => Some(TagStyle::Equals),
            "_is_" => Some(TagStyle::Is),
            _ => None,
        }
    }

    pub fn separator(self) -> Option<&'static str> {
        match self {
            TagStyle::Off => None,
            TagStyle::Equals => Some("="),
            TagStyle::Is => Some("_is_"),
        }
    }
}

/// Join `prefix` and `parts` with dots, skipping empty segments.
pub fn join<S: AsRef<str>>(prefix: &str, parts: &[S]) -> String {
    std::iter::once(prefix)
        .chain(parts.iter().map(|p| p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Render a Rust path (`a::b::index`) as a dotted handler identifier.
pub fn handler_path(type_name: &str) -> String {
    type_name.replace("::", ".")
}

/// Handler identifier as it appears in the metric path.
pub fn view_label(style: TagStyle, handler: &str) -> String {
    match style.separator() {
        None => handler.to_string(),
        Some(sep) => format!("view{sep}{}", handler.replace('.', "_")),
    }
}

/// Metric path segments for a finished request: `(method, view[, is_ajax])`.
///
/// `view` is expected to be already rendered by [`view_label`].
pub fn request_parts(style: TagStyle, method: &str, view: &str, ajax: bool) -> Vec<String> {
    let method = method.to_lowercase();
    match style.separator() {
        None => {
            let method = if ajax { format!("{method}_ajax") } else { method };
            vec![method, view.to_string()]
        }
        Some(sep) => vec![
            format!("method{sep}{}", method.replace('.', "_")),
            view.to_string(),
            format!("is_ajax{sep}{ajax}"),
        ],
    }
}

/// Queue segment of a routing key: everything before the first `.`
/// (drops `.fifo` and similar suffixes).
pub fn queue_key(routing_key: &str) -> &str {
    routing_key.split('.').next().unwrap_or(routing_key)
}

/// `"{task}.queue_{queue}"`, falling back to `default_queue` when no
/// routing key is known.
pub fn task_queue_name(task: &str, routing_key: Option<&str>, default_queue: &str) -> String {
    let queue = routing_key
        .map(queue_key)
        .filter(|q| !q.is_empty())
        .unwrap_or(default_queue);
    format!("{task}.queue_{queue}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_skips_empty_parts() {
        assert_eq!(join("view", &["get", "", "a.b"]), "view.get.a.b");
        assert_eq!(join("", &["site"]), "site");
        assert_eq!(join::<&str>("view", &[]), "view");
    }

    #[test]
    fn tag_like_view_label() {
        assert_eq!(view_label(TagStyle::Is, "a.b.View"), "view_is_a_b_View");
        assert_eq!(view_label(TagStyle::Equals, "a.b.View"), "view=a_b_View");
        assert_eq!(view_label(TagStyle::Off, "a.b.View"), "a.b.View");
    }

    #[test]
    fn request_parts_plain_and_ajax() {
        assert_eq!(request_parts(TagStyle::Off, "GET", "x.y", false), vec!["get", "x.y"]);
        assert_eq!(request_parts(TagStyle::Off, "POST", "x.y", true), vec!["post_ajax", "x.y"]);
    }

    #[test]
    fn request_parts_tag_like() {
        let parts = request_parts(TagStyle::Is, "GET", "view_is_x_y", true);
        assert_eq!(parts, vec!["method_is_get", "view_is_x_y", "is_ajax_is_true"]);
    }

    #[test]
    fn task_queue_name_strips_suffix() {
        assert_eq!(
            task_queue_name("tasks.debug", Some("celery"), "default"),
            "tasks.debug.queue_celery"
        );
        assert_eq!(task_queue_name("t", Some("orders.fifo"), "default"), "t.queue_orders");
        assert_eq!(task_queue_name("t", None, "default"), "t.queue_default");
        assert_eq!(task_queue_name("t", Some(""), "default"), "t.queue_default");
    }

    #[test]
    fn handler_path_uses_dots() {
        assert_eq!(handler_path("pkg::views::index"), "pkg.views.index");
    }

    #[test]
    fn unknown_token_is_rejected() {
        assert_eq!(TagStyle::from_token(":"), None);
        assert_eq!(TagStyle::from_token("_is_"), Some(TagStyle::Is));
    }
}
