use std::time::Duration;

use f2b_console::services::api_client::{Backend, HttpBackend, Request};
use f2b_console::utils::config::DEFAULT_ENDPOINT;

// Smoke test against a live endpoint: read-only actions by default, plus a
// ban/unban round trip of a documentation address when a jail is given.
//
//   test_api [ENDPOINT] [JAIL]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let endpoint = args.next().unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let jail = args.next();

    println!("Testing f2b-console API against {}...", endpoint);
    let backend = match HttpBackend::new(&endpoint, Some(Duration::from_secs(10))) {
        Ok(backend) => backend,
        Err(e) => {
            println!("✗ Could not create HTTP client: {}", e);
            return;
        }
    };

    println!("\nTesting status...");
    match backend.call(&Request::Status) {
        Ok(envelope) if envelope.success => {
            let jails = envelope.jails();
            println!("✓ Found {} jails", jails.len());
            for j in &jails {
                println!("  - {} enabled={} curBan={} banIPs={}", j.name, j.enabled, j.cur_ban, j.ban_ips.len());
            }
        }
        Ok(envelope) => println!("✗ Status rejected: {:?}", envelope.message),
        Err(e) => {
            println!("✗ Status failed: {}", e);
            return;
        }
    }

    println!("\nTesting audit...");
    match backend.call(&Request::Audit {
        filter: String::new(),
        limit: 10,
    }) {
        Ok(envelope) => match envelope.entries() {
            Some(entries) if envelope.success => {
                println!("✓ {} audit entries", entries.len());
                for entry in entries.iter().take(5) {
                    println!("  {}  {}", entry.headline(), entry.detail());
                }
            }
            _ => println!("⚠ Audit returned no entries: {:?}", envelope.message),
        },
        Err(e) => println!("✗ Audit failed: {}", e),
    }

    let Some(jail) = jail else {
        println!("\nNo jail given - skipping ban/unban round trip");
        return;
    };

    // TEST-NET-3, never routed.
    let test_ip = "203.0.113.254".to_string();
    println!("\nTesting read of jail '{}'...", jail);
    match backend.call(&Request::Read { jail: jail.clone() }) {
        Ok(envelope) if envelope.success => {
            println!("✓ Read {} bytes of configuration", envelope.content().len())
        }
        Ok(envelope) => println!("✗ Read rejected: {:?}", envelope.message),
        Err(e) => println!("✗ Read failed: {}", e),
    }

    println!("\nTesting ban of {} in '{}'...", test_ip, jail);
    match backend.call(&Request::Ban {
        jail: jail.clone(),
        ip: test_ip.clone(),
    }) {
        Ok(envelope) if envelope.success => println!("✓ Banned"),
        Ok(envelope) => println!("✗ Ban rejected: {:?}", envelope.message),
        Err(e) => println!("✗ Ban failed: {}", e),
    }

    println!("\nTesting unban of {} in '{}'...", test_ip, jail);
    match backend.call(&Request::Unban {
        jail: jail.clone(),
        ip: test_ip,
    }) {
        Ok(envelope) if envelope.success => println!("✓ Unbanned"),
        Ok(envelope) => println!("✗ Unban rejected: {:?}", envelope.message),
        Err(e) => println!("✗ Unban failed: {}", e),
    }

    println!("\nAPI smoke test complete");
}
