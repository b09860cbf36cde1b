mod common;

use ucan_inspector::ucan::capture::{bearer_token, parse_ucans_header, SourceHeader, WrapFormat};
use ucan_inspector::ucan::codec::encoding::base64_to_bytes;
use ucan_inspector::ucan::format::container::{self, ContainerCompression, ContainerHeader, TextEncoding};
use ucan_inspector::ucan::{ContainerError, RawTokenDecoder, TokenDecoder};
use ucan_inspector::{Capture, DecoderChain, ObservedRequest, Result, TokenType, UcanError};

struct Failing;

impl TokenDecoder for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }
    fn probe(&self, _input: &str) -> bool {
        true
    }
    fn decode(&self, _input: &str) -> Result<Vec<String>> {
        Err(UcanError::ContainerDecode(ContainerError::NotAMap))
    }
}

struct Empty;

impl TokenDecoder for Empty {
    fn name(&self) -> &'static str {
        "empty"
    }
    fn probe(&self, _input: &str) -> bool {
        true
    }
    fn decode(&self, _input: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

fn request(headers: &[(&str, &str)]) -> ObservedRequest {
    ObservedRequest {
        url: "https://api.example.test/echo".to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        observed_at: 1_765_548_700_000,
    }
}

fn invocation_container() -> String {
    let bytes = base64_to_bytes(common::INVOCATION_TOKEN).expect("fixture is base64");
    let header = ContainerHeader::for_options(TextEncoding::Base64, ContainerCompression::Gzip);
    container::wrap(&[bytes], header).expect("wrap")
}

#[test]
fn standalone_tokens_pass_through() {
    let chain = DecoderChain::standard();
    assert_eq!(
        chain.decode(common::DELEGATION_TOKEN),
        vec![common::DELEGATION_TOKEN.to_string()]
    );
    assert_eq!(chain.decode(""), vec![String::new()]);
}

#[test]
fn chain_moves_past_failing_and_empty_decoders() {
    let chain = DecoderChain::new(vec![Box::new(Failing), Box::new(Empty), Box::new(RawTokenDecoder)]);
    assert_eq!(chain.decode("abc"), vec!["abc".to_string()]);

    let nothing_applies = DecoderChain::new(vec![Box::new(Failing)]);
    assert_eq!(nothing_applies.decode("abc"), vec!["abc".to_string()]);
}

#[test]
fn captures_from_both_headers_in_order() {
    let bearer = format!("Bearer {}", common::DELEGATION_TOKEN);
    let ucans = format!("{}, not-a-token", invocation_container());
    let req = request(&[
        ("Authorization", bearer.as_str()),
        ("Content-Type", "application/json"),
        ("ucans", ucans.as_str()),
    ]);

    let items = Capture::default().capture_from_request(&req);
    assert_eq!(items.len(), 3);

    assert_eq!(items[0].token, common::DELEGATION_TOKEN);
    assert_eq!(items[0].header, SourceHeader::Authorization);
    assert_eq!(items[0].format, WrapFormat::Raw);
    assert_eq!(items[0].token_type.token_type, TokenType::Delegation);

    assert_eq!(items[1].header, SourceHeader::Ucans);
    assert_eq!(items[1].format, WrapFormat::Container);
    assert_eq!(items[1].token_type.token_type, TokenType::Invocation);

    assert_eq!(items[2].token, "not-a-token");
    assert_eq!(items[2].format, WrapFormat::Raw);
    assert!(items[2].token_type.is_unknown(), "unknown tokens are still emitted");

    for item in &items {
        assert_eq!(item.url, req.url);
        assert_eq!(item.captured_at, req.observed_at);
    }
}

#[test]
fn non_bearer_authorization_is_ignored() {
    let req = request(&[("authorization", "Basic dXNlcjpwYXNz"), ("x-other", "Bearer abc")]);
    assert!(Capture::default().capture_from_request(&req).is_empty());
}

#[test]
fn header_names_are_case_insensitive() {
    let req = request(&[("UCANS", common::INVOCATION_TOKEN)]);
    let items = Capture::default().capture_from_request(&req);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].token_type.token_type, TokenType::Invocation);
}

#[test]
fn items_serialize_as_camel_case() {
    let bearer = format!("Bearer {}", common::DELEGATION_TOKEN);
    let items = Capture::default().capture_from_request(&request(&[("Authorization", bearer.as_str())]));
    let json = serde_json::to_value(&items[0]).expect("serialize");

    assert_eq!(json["header"], "Authorization");
    assert_eq!(json["format"], "raw");
    assert_eq!(json["capturedAt"], 1_765_548_700_000u64);
    assert_eq!(json["tokenType"]["type"], "delegation");
    assert_eq!(json["tokenType"]["version"], "1.0.0-rc.1");
}

#[test]
fn header_value_parsing() {
    assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
    assert_eq!(bearer_token("Basic abc"), None);
    assert_eq!(parse_ucans_header(" a, ,b ,"), vec!["a", "b"]);
    assert!(parse_ucans_header("").is_empty());
}

#[test]
fn capture_without_cache_leaves_decoder_cache_empty() {
    let req = request(&[("ucans", common::INVOCATION_TOKEN)]);

    let uncached = Capture::default().with_cache(false);
    let items = uncached.capture_from_request(&req);
    assert_eq!(items[0].token_type.token_type, TokenType::Invocation);
    assert_eq!(uncached.decoder().cache_len(), 0);

    let cached = Capture::default();
    cached.capture_from_request(&req);
    assert_eq!(cached.decoder().cache_len(), 1);
}
