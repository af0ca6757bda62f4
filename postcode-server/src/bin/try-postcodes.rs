//! Try the postcode lookup against a running server.
//!
//! ```text
//! try-postcodes "SW8 1HL" "N7 7AJ, DD6 9DD"
//! ```

use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "try-postcodes")]
#[command(about = "Send postcodes to a running lookup server and print the reply")]
struct Cli {
    /// Server to send requests to (must be running)
    #[arg(long, default_value = "http://127.0.0.1:5000/")]
    url: String,

    /// Token to authenticate with
    #[arg(long, default_value = "testing", env = "AUTH_TOKEN")]
    token: String,

    /// Postcodes to look up; each argument may be a comma separated list
    #[arg(required = true)]
    postcodes: Vec<String>,
}

/// Split comma separated arguments into individual postcodes.
fn split_postcodes(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(|pc| pc.trim_matches(|c| c == ' ' || c == ',').to_string())
        .collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let postcodes = split_postcodes(&cli.postcodes);

    let response = match reqwest::Client::new()
        .post(&cli.url)
        .header("Authorization", format!("Token {}", cli.token))
        .json(&postcodes)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            eprintln!("request failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let status = response.status();
    println!("response status: {}", status.as_u16());
    if !status.is_success() {
        println!("bad response code, exiting");
        return ExitCode::FAILURE;
    }

    match response.json::<serde_json::Value>().await {
        Ok(body) => {
            println!("content:");
            match serde_json::to_string_pretty(&body) {
                Ok(pretty) => println!("{pretty}"),
                Err(_) => println!("{body}"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("invalid response body: {e}");
            ExitCode::FAILURE
        }
    }
}
