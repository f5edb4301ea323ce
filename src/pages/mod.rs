//! HTML error page rendering.
//!
//! # Responsibilities
//! - Render the standalone page substituted for a filtered response
//!
//! # Design Decisions
//! - Plain placeholder substitution into a `const` template; the page is
//!   small and fixed, a template engine would be dead weight
//! - Unknown status codes fall back to a generic message

use http::StatusCode;

/// Build the HTML body substituted for a filtered status.
pub fn error_body(status: StatusCode) -> String {
    let message = status.canonical_reason().unwrap_or("Unexpected Error");
    TEMPLATE
        .replace("{{status}}", &status.as_u16().to_string())
        .replace("{{message}}", message)
}

const TEMPLATE: &str = r#"<html lang="en">

  <head>
    <meta charset="utf-8">
    <meta name="viewport"
      content="width=device-width, initial-scale=1">
    <meta name="robots"
      content="noindex, nofollow">
    <title>{{message}}</title>
    <style>
      html,
      body {
        background-color: #222526;
        color: #fff;
        font-family: 'Nunito', sans-serif;
        font-weight: 100;
        height: 100vh;
        margin: 0;
        font-size: 0
      }

      .full-height {
        height: 100vh
      }

      .flex-center {
        align-items: center;
        display: flex;
        justify-content: center
      }

      .position-ref {
        position: relative
      }

      .code {
        border-right: 2px solid;
        font-size: 26px;
        padding: 0 10px 0 15px;
        text-align: center
      }

      .message {
        font-size: 18px;
        text-align: center;
        padding: 10px
      }
    </style>
  </head>

  <body>
    <div class="flex-center position-ref full-height">
      <div>
        <div class="flex-center">
          <div class="code">
            {{status}}
          </div>
          <div class="message">
            {{message}}
          </div>
        </div>
      </div>
    </div>
  </body>

</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_contains_status_and_reason() {
        for code in [400u16, 404, 500, 503] {
            let status = StatusCode::from_u16(code).unwrap();
            let body = error_body(status);
            assert!(body.contains(&code.to_string()), "missing code {code}");
            assert!(body.contains(status.canonical_reason().unwrap()));
        }
    }

    #[test]
    fn test_unknown_status_uses_fallback_message() {
        let status = StatusCode::from_u16(599).unwrap();
        let body = error_body(status);
        assert!(body.contains("599"));
        assert!(body.contains("Unexpected Error"));
    }

    #[test]
    fn test_no_placeholders_survive_rendering() {
        let body = error_body(StatusCode::NOT_FOUND);
        assert!(!body.contains("{{"));
    }
}
