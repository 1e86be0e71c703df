#![allow(dead_code)]

use axum::{response::IntoResponse, routing::post, Form, Json, Router};
use serde_json::json;
use snapferry_lib::codec::convert_base;
use std::{collections::HashMap, net::SocketAddr};
use tokio::{net::TcpListener, task::JoinHandle};

const ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+/";

/// Markup the resolver would hand back for a two-item post: one video,
/// one image, plus a profile anchor the extractor mines for a username.
pub fn sample_markup() -> String {
    concat!(
        r#"<div class="download-wrapper">"#,
        r#"<a href="https://www.instagram.com/testuser/">@testuser</a>"#,
        r#"<div class="download-items">"#,
        r#"<img data-src="https://cdn.mock/thumb-video.jpg" src="img/loading.gif">"#,
        r#"<i class="icon-dlvideo"></i>"#,
        r#"<a class="abutton" href="https://cdn.mock/clip.mp4">Download Video</a>"#,
        r#"</div>"#,
        r#"<div class="download-items">"#,
        r#"<img src="https://cdn.mock/thumb-photo.jpg">"#,
        r#"<i class="icon-dlimage"></i>"#,
        r#"<a class="abutton" href="https://cdn.mock/photo.jpg">Download Photo</a>"#,
        r#"</div>"#,
        r#"</div>"#,
    )
    .to_string()
}

/// Obfuscates `text` the way the resolver's packer does: each char code
/// is shifted, rendered in base `radix` over the alphabet's symbols,
/// and terminated with the delimiter symbol `alphabet[radix]`.
pub fn pack_payload(text: &str, alphabet: &str, shift: u32, radix: usize) -> String {
    let chars: Vec<char> = alphabet.chars().collect();
    let delimiter = chars[radix];
    let mut body = String::new();
    for ch in text.chars() {
        let numeral = convert_base(&(ch as u32 + shift).to_string(), 10, radix as u32);
        for digit in numeral.chars() {
            let idx = ALPHABET.find(digit).expect("digit in alphabet");
            body.push(chars[idx]);
        }
        body.push(delimiter);
    }
    format!(
        r#"eval(function(h,u,n,t,e,r){{return decoded}}("{}",36,"{}",{},{},0))"#,
        body, alphabet, shift, radix
    )
}

/// Packs the sample markup behind an innerHTML assignment, matching the
/// shape of real resolver payloads.
pub fn packed_sample_payload() -> String {
    let escaped = sample_markup().replace('\\', "\\\\").replace('"', "\\\"");
    let script = format!(
        r##"var box = document.querySelector("#download-box");box.innerHTML = "{}";"##,
        escaped
    );
    // Index substitution concatenates decimal index strings, so the
    // digit set must stay single-digit (radix <= 10) to stay reversible.
    pack_payload(&script, "qwertyuiopa", 7, 10)
}

/// Minimal local mock of the SnapInsta verify/search API.
///
/// Behavior is keyed off the submitted post URL so tests never need the
/// real resolver:
///   contains "reject"       -> verification fails
///   contains "notoken"      -> verification succeeds without a token
///   contains "badstatus"    -> search status != ok
///   contains "nodata"       -> search ok but no data field
///   contains "emptydata"    -> search ok with whitespace data
///   contains "slowresolver" -> response delayed 2s
///   contains "noitems"      -> markup with no download items
///   contains "plainmarkup"  -> unobfuscated markup payload
///   anything else           -> packed markup payload
pub struct MockSnapInstaServer {
    pub base_url: String,
    _task: JoinHandle<()>,
}

impl MockSnapInstaServer {
    pub async fn start() -> Self {
        async fn verify(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
            let url = form.get("url").map(|s| s.as_str()).unwrap_or("");
            if url.contains("reject") {
                return Json(json!({"success": false}));
            }
            if url.contains("notoken") {
                return Json(json!({"success": true}));
            }
            Json(json!({"success": true, "token": "mock-cf-token"}))
        }

        async fn search(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
            let q = form.get("q").map(|s| s.as_str()).unwrap_or("");
            assert_eq!(
                form.get("cftoken").map(|s| s.as_str()),
                Some("mock-cf-token"),
                "search must carry the verification token"
            );

            if q.contains("slowresolver") {
                tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            }
            if q.contains("badstatus") {
                return Json(json!({"status": "error", "data": "nope"}));
            }
            if q.contains("nodata") {
                return Json(json!({"status": "ok"}));
            }
            if q.contains("emptydata") {
                return Json(json!({"status": "ok", "data": "   "}));
            }
            if q.contains("noitems") {
                return Json(json!({"status": "ok", "data": "<div class=\"empty\">Nothing here</div>"}));
            }
            if q.contains("plainmarkup") {
                return Json(json!({"status": "ok", "data": sample_markup()}));
            }
            Json(json!({"status": "ok", "data": packed_sample_payload()}))
        }

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr: SocketAddr = listener
            .local_addr()
            .expect("failed to get mock server addr");
        let base_url = format!("http://{}", addr);

        let app = Router::new()
            .route("/api/userverify", post(verify))
            .route("/api/ajaxSearch", post(search));

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock server failed");
        });

        Self {
            base_url,
            _task: task,
        }
    }
}
