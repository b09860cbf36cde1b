use std::env;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use ucan_inspector::{Capture, Limits, ObservedRequest};

struct Options {
    json: bool,
    use_cache: bool,
    limits: Limits,
    url: String,
    headers: Vec<(String, String)>,
    tokens: Vec<String>,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} [--json] [--no-cache] [--max-depth <N>] [--url <URL>] [--header \"<Name>: <value>\"]... [TOKEN]...",
        program
    );
    process::exit(1);
}

fn parse_args(args: &[String]) -> Options {
    let program = args.first().map(String::as_str).unwrap_or("ucan-inspector");
    let mut options = Options {
        json: false,
        use_cache: true,
        limits: Limits::default(),
        url: String::new(),
        headers: Vec::new(),
        tokens: Vec::new(),
    };

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--no-cache" => options.use_cache = false,
            "--max-depth" => {
                let Some(depth) = rest.next().and_then(|v| v.parse().ok()) else {
                    eprintln!("ERROR: --max-depth requires a number.");
                    process::exit(1);
                };
                options.limits.max_depth = depth;
            }
            "--url" => match rest.next() {
                Some(url) => options.url = url.clone(),
                None => {
                    eprintln!("ERROR: --url flag requires an argument.");
                    process::exit(1);
                }
            },
            "--header" => match rest.next().and_then(|h| h.split_once(':')) {
                Some((name, value)) => options
                    .headers
                    .push((name.trim().to_string(), value.trim_start().to_string())),
                None => {
                    eprintln!("ERROR: Invalid header format. Expected \"<Name>: <value>\"");
                    process::exit(1);
                }
            },
            "--help" | "-h" => usage(program),
            _ => options.tokens.push(arg.clone()),
        }
    }

    if options.headers.is_empty() && options.tokens.is_empty() {
        usage(program);
    }
    options
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);
    let capture = Capture::with_limits(options.limits).with_cache(options.use_cache);

    // Bare tokens are inspected as if they arrived in a `ucans` header.
    let mut headers = options.headers.clone();
    if !options.tokens.is_empty() {
        headers.push(("ucans".to_string(), options.tokens.join(",")));
    }
    let request = ObservedRequest {
        url: options.url.clone(),
        headers,
        observed_at: now_millis(),
    };

    let items = capture.capture_from_request(&request);

    if options.json {
        match serde_json::to_string_pretty(&items) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("ERROR: Failed to serialize results: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("Captured {} token(s)", items.len());
    println!("{}", "=".repeat(60));

    for (i, item) in items.iter().enumerate() {
        println!("\n{}. [{:?} / {:?}] {}", i + 1, item.header, item.format, item.token_type.token_type);
        if let Some(version) = &item.token_type.version {
            println!("  Version: {}", version);
        }

        match capture.decoder().decode_with_meta(item.token.as_str(), options.use_cache) {
            Ok(meta) => {
                println!("  Encoding: {} ({} bytes)", meta.format, meta.size);
                match serde_json::to_string_pretty(&meta.value.to_json()) {
                    Ok(text) => println!("  Decoded:\n{}", text),
                    Err(e) => println!("  Decoded: <unprintable: {}>", e),
                }
            }
            Err(e) => {
                let format = e
                    .detected_format()
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!("  Not decodable ({}): {}", format, e);
            }
        }
    }
}
