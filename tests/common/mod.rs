use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::json;
use tempfile::TempDir;

use fairfare::models::{GoogleUser, NewTip, TransportMode};
use fairfare::session::{MemorySlotStore, SessionContext};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// An unsigned JWT carrying a Google profile
#[allow(dead_code)]
pub fn google_credential(name: &str, email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({ "name": name, "email": email, "picture": "", "sub": "42" }).to_string(),
    );
    format!("{}.{}.sig", header, payload)
}

#[allow(dead_code)]
pub fn profile(name: &str) -> GoogleUser {
    GoogleUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        picture: String::new(),
    }
}

#[allow(dead_code)]
pub fn signed_in(name: &str, token: &str) -> SessionContext {
    SessionContext::establish(&MemorySlotStore::new(), profile(name), token.to_string())
        .expect("failed to establish session")
}

#[allow(dead_code)]
pub fn ferry_tip() -> NewTip {
    NewTip {
        origin: "Gateway of India".to_string(),
        destination: "Elephanta Caves".to_string(),
        transport_mode: TransportMode::Ferry,
        estimated_cost: "₹260 return".to_string(),
        estimated_time: "1 hour".to_string(),
        advice: "Buy the return ticket at the jetty; the last ferry back leaves at 5:30 PM."
            .to_string(),
    }
}

/// A tip as the REST API would return it
#[allow(dead_code)]
pub fn tip_json(id: i64, username: &str, score: i64, rating: i64) -> serde_json::Value {
    json!({
        "id": id,
        "origin": "Connaught Place",
        "destination": "Chandni Chowk",
        "transportMode": "AutoRickshaw",
        "estimatedCost": "₹80-120",
        "estimatedTime": "15-20 minutes",
        "advice": "Agree on the fare first.",
        "user": { "username": username, "score": score, "badges": ["Bargain Hunter"] },
        "rating": rating
    })
}
