//! Host-side helper: `cargo run [port]` builds the WASM package into
//! `static/pkg` and serves `static/` locally.

use std::process::{Command, Stdio};
use std::{env, thread, time::Duration};

const DEFAULT_PORT: u16 = 8000;

fn main() {
    // Only meaningful on non-wasm targets.
    if cfg!(target_arch = "wasm32") {
        return;
    }

    let port = match env::args().nth(1) {
        Some(arg) => match arg.parse::<u16>() {
            Ok(p) => p,
            Err(_) => {
                eprintln!("invalid port {arg:?}");
                std::process::exit(2);
            }
        },
        None => DEFAULT_PORT,
    };

    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Skipping wasm build; the site may serve stale artifacts.");
        }
    }

    println!("Launching local server at http://127.0.0.1:{port} …");
    let server = Command::new("python3")
        .args(["-m", "http.server", &port.to_string(), "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    if let Err(e) = server {
        eprintln!("failed to start http server: {e}");
        std::process::exit(1);
    }

    // Keep process alive
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
