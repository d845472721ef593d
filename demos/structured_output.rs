//! Requests a schema-constrained answer from an Ollama server.
//!
//! The JSON schema of `Person` is sent as the `format` field of `/api/chat`
//! and the answer is parsed back into the typed model.
//!
//! ```text
//! cargo run --example structured_output -- https://ollama.example.com llama3.2
//! ```

use anyhow::Context;
use llm_read::{ChatClient, Message, StructuredRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const DEFAULT_HOST: &str = "https://ollama.themajorones.dev";
const DEFAULT_MODEL: &str = "llama3.2";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Identity {
    first_name: String,
    last_name: String,
    age: u32,
    passport_number: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Person {
    real_first_name: String,
    real_last_name: String,
    real_age: u32,
    list_of_identities: Vec<Identity>,
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| DEFAULT_HOST.to_string());
    let model = args.next().unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let schema = serde_json::to_value(schemars::schema_for!(Person))?;
    let request = StructuredRequest::new(
        model,
        vec![Message::user("generate a person with 3 fake identities.")],
        schema,
    );

    let client = ChatClient::new(format!("{}/api/chat", host.trim_end_matches('/')), None)?;
    let content = client
        .complete_structured(&request)
        .context("Structured request failed")?;

    let person: Person =
        serde_json::from_str(&content).context("Answer does not match the Person schema")?;

    println!("{}", serde_json::to_string_pretty(&person)?);

    Ok(())
}
