use async_graphql::http::GraphiQLSource;
use lambda_http::http::{header::ACCEPT, HeaderMap};

/// True when the `Accept` header ranks `text/html` strictly above
/// `application/json`. A missing header or a bare wildcard keeps JSON.
pub(crate) fn wants_html(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(ACCEPT).and_then(|value| value.to_str().ok()) else {
        return false;
    };

    let mut html = 0.0_f32;
    let mut json = 0.0_f32;
    for entry in accept.split(',') {
        let mut parts = entry.trim().split(';');
        let media = parts.next().unwrap_or("").trim();
        let quality = parts
            .find_map(|param| param.trim().strip_prefix("q="))
            .and_then(|q| q.parse::<f32>().ok())
            .unwrap_or(1.0);
        match media {
            "text/html" | "text/*" => html = html.max(quality),
            "application/json" | "application/*" => json = json.max(quality),
            "*/*" => {
                html = html.max(quality);
                json = json.max(quality);
            }
            _ => {}
        }
    }
    html > json
}

pub(crate) fn render(endpoint: &str) -> String {
    GraphiQLSource::build().endpoint(endpoint).finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http::HeaderValue;

    fn accept(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn browser_accept_header_prefers_html() {
        assert!(wants_html(&accept(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
        )));
    }

    #[test]
    fn json_clients_stay_on_json() {
        assert!(!wants_html(&accept("application/json")));
        assert!(!wants_html(&accept("application/json, text/html;q=0.5")));
    }

    #[test]
    fn wildcards_and_missing_header_are_a_tie() {
        assert!(!wants_html(&accept("*/*")));
        assert!(!wants_html(&HeaderMap::new()));
    }

    #[test]
    fn plain_html_wins() {
        assert!(wants_html(&accept("text/html")));
        assert!(wants_html(&accept("text/*")));
    }

    #[test]
    fn rendered_page_targets_the_endpoint() {
        let page = render("/graphql");
        assert!(page.contains("/graphql"));
    }
}
