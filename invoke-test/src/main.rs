use aws_config::BehaviorVersion;
use aws_sdk_lambda::Client;
use clap::Parser;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "HEAD"];
const PATHS: &[&str] = &["/", "/hello", "/greet/me", "/index.html", "/api/v1/ping"];

#[derive(Default)]
struct Stats {
    success_count: usize,
    error_count: usize,
    bodies: HashSet<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct HandlerResponse {
    status_code: u16,
    body: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Success { status_code: u16, body: String },
    Error(String),
}

#[derive(Parser, Debug)]
#[command(name = "invoke-test")]
#[command(about = "Invoke a greeting function repeatedly and check its responses")]
struct Args {
    /// Lambda function name
    function: String,

    /// Number of iterations to run
    #[arg(long, default_value = "100")]
    iters: usize,

    /// Number of parallel threads
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Name the function is configured with; bodies must greet it
    #[arg(long)]
    expect_name: Option<String>,
}

fn random_request(rng: &mut impl Rng) -> serde_json::Value {
    let method = METHODS.choose(rng).copied().unwrap_or("GET");
    let path = PATHS.choose(rng).copied().unwrap_or("/");
    let page: u32 = rng.gen_range(1..=50);

    serde_json::json!({
        "method": method,
        "path": path,
        "headers": { "user-agent": "invoke-test" },
        "query": { "page": page.to_string() },
    })
}

/// Classifies a raw function reply.
fn check_response(payload: &str, expect_name: Option<&str>) -> Outcome {
    let response = match serde_json::from_str::<HandlerResponse>(payload) {
        Ok(response) => response,
        Err(_) if payload.contains("errorType") || payload.contains("errorMessage") => {
            return Outcome::Error(format!("function error: {payload}"));
        }
        Err(e) => return Outcome::Error(format!("malformed response ({e}): {payload}")),
    };

    if !(100..=599).contains(&response.status_code) {
        return Outcome::Error(format!("invalid status code {}", response.status_code));
    }

    if let Some(name) = expect_name {
        let expected = format!("Hello, {name}!");
        if response.body != expected {
            return Outcome::Error(format!("expected {expected:?}, got {:?}", response.body));
        }
    }

    Outcome::Success {
        status_code: response.status_code,
        body: response.body,
    }
}

async fn run_invocations(
    client: Arc<Client>,
    function_name: String,
    expect_name: Option<String>,
    thread_id: usize,
    start: usize,
    end: usize,
    total: usize,
    stats: Arc<Mutex<Stats>>,
) {
    let mut rng = StdRng::from_entropy();

    for i in start..=end {
        let request = random_request(&mut rng);
        let payload = match serde_json::to_vec(&request) {
            Ok(payload) => payload,
            Err(e) => {
                eprintln!("[Thread {}: {}/{}] Could not encode request: {}", thread_id, i, total, e);
                stats.lock().await.error_count += 1;
                continue;
            }
        };

        let result = client
            .invoke()
            .function_name(&function_name)
            .payload(aws_sdk_lambda::primitives::Blob::new(payload))
            .send()
            .await;

        match result {
            Ok(response) => {
                let response_payload = response
                    .payload()
                    .map(|b| String::from_utf8_lossy(b.as_ref()).to_string())
                    .unwrap_or_else(|| "No response".to_string());

                let outcome = match response.function_error() {
                    Some(kind) => {
                        Outcome::Error(format!("function error ({kind}): {response_payload}"))
                    }
                    None => check_response(&response_payload, expect_name.as_deref()),
                };

                {
                    let mut stats = stats.lock().await;
                    match &outcome {
                        Outcome::Success { body, .. } => {
                            stats.success_count += 1;
                            stats.bodies.insert(body.clone());
                        }
                        Outcome::Error(_) => stats.error_count += 1,
                    }
                }

                match outcome {
                    Outcome::Success { status_code, body } => println!(
                        "[Thread {}: {}/{}] {} {} => {} {:?}",
                        thread_id, i, total, request["method"], request["path"], status_code, body
                    ),
                    Outcome::Error(reason) => eprintln!(
                        "[Thread {}: {}/{}] {} {} => {}",
                        thread_id, i, total, request["method"], request["path"], reason
                    ),
                }
            }
            Err(e) => {
                stats.lock().await.error_count += 1;

                eprintln!(
                    "[Thread {}: {}/{}] Error invoking {}: {}",
                    thread_id, i, total, function_name, e
                );
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let threads = args.threads.max(1);

    println!(
        "Running {} invocations across {} thread(s)",
        args.iters, threads
    );

    // Create AWS Lambda client
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = Arc::new(Client::new(&config));

    let stats = Arc::new(Mutex::new(Stats::default()));

    // Calculate iterations per thread
    let iters_per_thread = args.iters / threads;
    let remainder = args.iters % threads;

    let mut tasks = JoinSet::new();

    let total_iters = args.iters;

    let mut start = 1;
    for t in 1..=threads {
        let count = if t == threads {
            iters_per_thread + remainder
        } else {
            iters_per_thread
        };
        if count == 0 {
            continue;
        }
        let end = start + count - 1;

        let client = Arc::clone(&client);
        let function_name = args.function.clone();
        let expect_name = args.expect_name.clone();
        let stats = Arc::clone(&stats);

        tasks.spawn(async move {
            run_invocations(
                client,
                function_name,
                expect_name,
                t,
                start,
                end,
                total_iters,
                stats,
            )
            .await;
        });

        start = end + 1;
    }

    // Wait for all tasks to complete
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            eprintln!("Task failed: {}", e);
        }
    }

    let stats = stats.lock().await;
    println!("Completed {} invocations", args.iters);
    println!();
    println!("Results:");
    println!("  Success: {}", stats.success_count);
    println!("  Errors:  {}", stats.error_count);
    println!("  Distinct bodies: {}", stats.bodies.len());
    if stats.bodies.len() > 1 {
        eprintln!("Responses differ across invocations: {:?}", stats.bodies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_greeting() {
        let outcome = check_response(r#"{"statusCode":200,"body":"Hello, Ada!"}"#, Some("Ada"));
        assert_eq!(
            outcome,
            Outcome::Success {
                status_code: 200,
                body: "Hello, Ada!".to_string()
            }
        );
    }

    #[test]
    fn rejects_unexpected_name() {
        let outcome = check_response(r#"{"statusCode":200,"body":"Hello, Unknown!"}"#, Some("Ada"));
        assert!(matches!(outcome, Outcome::Error(_)));
    }

    #[test]
    fn server_errors_are_still_well_formed() {
        let outcome = check_response(
            r#"{"statusCode":503,"body":"configuration unavailable: down"}"#,
            None,
        );
        assert!(matches!(outcome, Outcome::Success { status_code: 503, .. }));
    }

    #[test]
    fn rejects_function_errors_and_garbage() {
        let failed = check_response(r#"{"errorType":"Panic","errorMessage":"boom"}"#, None);
        assert!(matches!(failed, Outcome::Error(_)));

        let garbage = check_response("No response", None);
        assert!(matches!(garbage, Outcome::Error(_)));

        let missing_body = check_response(r#"{"statusCode":200}"#, None);
        assert!(matches!(missing_body, Outcome::Error(_)));
    }

    #[test]
    fn greeting_mentioning_error_fields_is_not_a_failure() {
        let outcome = check_response(
            r#"{"statusCode":200,"body":"Hello, errorMessage!"}"#,
            Some("errorMessage"),
        );
        assert_eq!(
            outcome,
            Outcome::Success {
                status_code: 200,
                body: "Hello, errorMessage!".to_string()
            }
        );

        let outcome = check_response(r#"{"statusCode":200,"body":"Hello, errorType!"}"#, None);
        assert!(matches!(outcome, Outcome::Success { status_code: 200, .. }));
    }

    #[test]
    fn rejects_out_of_range_status() {
        let outcome = check_response(r#"{"statusCode":42,"body":"Hello, Ada!"}"#, None);
        assert!(matches!(outcome, Outcome::Error(_)));
    }

    #[test]
    fn random_requests_are_parseable_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let request = random_request(&mut rng);
            assert!(METHODS.contains(&request["method"].as_str().unwrap()));
            assert!(PATHS.contains(&request["path"].as_str().unwrap()));
        }
    }
}
