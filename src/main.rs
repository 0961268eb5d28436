use anyhow::{bail, Context, Result};
use axum::serve;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};

use toughlife::api::auth_client::AuthClient;
use toughlife::api::chat_client::ChatClient;
use toughlife::api::status_client::{StatusBoard, StatusClient};
use toughlife::chat::room::ChatRoom;
use toughlife::core::config::Config;
use toughlife::core::routes::build_router;
use toughlife::core::state::AppState;
use toughlife::core::tracing_init::{init_tracing, LogTarget};
use toughlife::feedback::notice::Notice;
use toughlife::models::chat::ChatMessage;
use toughlife::session::controller::{SessionController, SessionState};
use toughlife::session::dialog::AuthDialog;
use toughlife::stores::kv_store::FileStore;
use toughlife::stores::session_store::SessionStore;
use toughlife::validation::forms::{LoginForm, RegisterForm};

const USAGE: &str = "Usage: toughlife <serve|chat> [config.toml]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    Chat,
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let command = match args.get(1).map(String::as_str) {
        Some("serve") => Command::Serve,
        Some("chat") => Command::Chat,
        Some(other) => bail!("Unknown command '{}'. {}", other, USAGE),
        None => bail!("{}", USAGE),
    };

    let config_path = if args.len() > 2 {
        PathBuf::from(&args[2])
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path)
        .context(format!(
            "Failed to load configuration from '{}'. \
            If this is your first run, copy config.example.toml to config.toml and adjust the values.",
            config_path.display()
        ))?;

    // The chat transcript owns stdout
    let target = match command {
        Command::Serve => LogTarget::Stdout,
        Command::Chat => LogTarget::Stderr,
    };
    init_tracing(&config.logging, target);

    // Build Tokio runtime with configured number of threads
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    match command {
        Command::Serve => runtime.block_on(run_server(config, config_path)),
        Command::Chat => runtime.block_on(run_chat(config)),
    }
}

async fn run_server(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        port = config.server.port,
        num_threads = config.server.num_threads,
        max_messages = config.server.max_messages,
        log_level = %config.logging.level,
        log_format = %config.logging.format,
        "ToughLife backend starting"
    );

    let state = Arc::new(AppState::new(config.clone()));

    let app = build_router(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
            .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
    );

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind TCP listener to {}", addr))?;

    info!(address = %addr, "TCP listener bound successfully");

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutting down gracefully");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

/// Terminal stand-in for the landing page: status line, auth commands and
/// the live chat feed
struct ChatTerminal {
    controller: SessionController<AuthClient>,
    dialog: AuthDialog,
    room: ChatRoom<ChatClient>,
    status_client: StatusClient,
    status: StatusBoard,
}

enum Flow {
    Continue,
    Quit,
}

impl ChatTerminal {
    async fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }

        let mut words = line.split_whitespace();
        match words.next() {
            Some("/quit") => return Flow::Quit,
            Some("/login") => {
                let (Some(username), Some(password)) = (words.next(), words.next()) else {
                    println!("Usage: /login <username or email> <password>");
                    return Flow::Continue;
                };
                let form = LoginForm::new(username, password);
                println!("{}", self.dialog.submit_login(&mut self.controller, &form).await);
            }
            Some("/register") => {
                let (Some(username), Some(email), Some(password)) =
                    (words.next(), words.next(), words.next())
                else {
                    println!("Usage: /register <username> <email> <password> [minecraft nick]");
                    return Flow::Continue;
                };
                let form = RegisterForm {
                    username: username.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                    confirm_password: password.to_string(),
                    minecraft_nick: words.next().unwrap_or_default().to_string(),
                };
                println!("{}", self.dialog.submit_register(&mut self.controller, &form).await);
            }
            Some("/logout") => {
                self.controller.logout();
                println!("{}", Notice::signed_out());
            }
            Some("/whoami") => match self.controller.user() {
                Some(user) => println!("Signed in as {} ({})", user.display_name(), user.email),
                None => println!("Not signed in"),
            },
            Some("/status") => match self.status.refresh(&self.status_client).await {
                Some(status) => println!("Server: {}", status),
                None => println!("Server status unavailable"),
            },
            Some(command) if command.starts_with('/') => {
                println!("Unknown command {}", command);
            }
            _ => {
                if let Err(e) = self.room.send(self.controller.session(), line).await {
                    println!("{}", Notice::from_failure(&e, "Error", "Could not send message"));
                }
            }
        }

        Flow::Continue
    }
}

/// Print the messages of `window` newer than the last one shown
fn print_new(window: &[ChatMessage], last_shown: &mut Option<i64>) {
    for message in window {
        if last_shown.is_some_and(|last| message.id <= last) {
            continue;
        }
        println!("{}", message);
        *last_shown = Some(message.id);
    }
}

async fn run_chat(config: Config) -> Result<()> {
    let client = &config.client;
    let timeout = client.request_timeout();

    let file = FileStore::open(client.session_path.clone());
    let auth = AuthClient::new(client.auth_endpoint.clone(), timeout)?;
    let chat = ChatClient::new(client.chat_endpoint.clone(), timeout)?;

    info!(
        auth_endpoint = %auth.endpoint(),
        chat_endpoint = %chat.endpoint(),
        session_path = %file.path().display(),
        poll_interval_seconds = client.poll_interval,
        "ToughLife chat starting"
    );

    let store = SessionStore::new(file);

    let mut terminal = ChatTerminal {
        controller: SessionController::new(store, auth),
        dialog: AuthDialog::new(),
        room: ChatRoom::new(chat),
        status_client: StatusClient::new(client.status_endpoint.clone(), timeout)?,
        status: StatusBoard::new(),
    };

    if let Some(status) = terminal.status.refresh(&terminal.status_client).await {
        println!("Server: {}", status);
    }

    match terminal.controller.restore().await {
        SessionState::Authenticated(session) => {
            println!("Signed in as {}", session.user.display_name());
        }
        _ => println!("Not signed in. Use /login or /register to chat."),
    }

    let poller = terminal
        .room
        .start_polling(client.poll_interval(), client.fetch_limit);
    let mut updates = terminal.room.feed().subscribe();
    let mut last_shown = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let window = updates.borrow_and_update().clone();
                print_new(&window, &mut last_shown);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if let Flow::Quit = terminal.handle_line(&line).await {
                    break;
                }
            }
            _ = signal::ctrl_c() => break,
        }
    }

    poller.stop().await;

    Ok(())
}
