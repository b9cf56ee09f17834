use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use taskshare::api::{Api, HttpApi};
use taskshare::config::Config;
use taskshare::controllers::{
    DashboardController, LoginController, Navigation, ProfileController, RegisterController,
    TaskListController,
};
use taskshare::domain::SharePermission;
use taskshare::session::{AuthGate, CredentialStore, FileCredentialStore, GateDecision, SessionStore};
use taskshare::store::EntityStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = Config::load()?;
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(config.credential_path()?));
    let api: Arc<dyn Api> = Arc::new(HttpApi::new(
        config.api_url.as_str(),
        Duration::from_secs(config.request_timeout_secs),
        credentials.clone(),
    ));
    let session = Arc::new(SessionStore::new(credentials.clone()));
    let store = Arc::new(EntityStore::new());

    // Silent resume: a stale token just means we start logged out.
    session.initialize(api.as_ref()).await;
    match session.current_user() {
        Some(user) => println!("Welcome back, {}.", user.name),
        None => println!("Not logged in. Try `login <email> <password>`."),
    }

    let gate = AuthGate::new();
    let dashboard = DashboardController::new(api.clone(), store.clone());
    let mut open_list: Option<TaskListController> = None;

    let stdin = std::io::stdin();
    loop {
        print!("taskshare> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            continue;
        };

        match command {
            "help" => print_help(),
            "quit" | "exit" => break,
            "login" => {
                let [email, password] = args else {
                    println!("usage: login <email> <password>");
                    continue;
                };
                let controller =
                    LoginController::new(api.clone(), session.clone(), credentials.clone());
                match controller.submit(email, password).await {
                    Navigation::Dashboard => println!("Logged in."),
                    _ => println!("Login failed: {}", controller.error().unwrap_or_default()),
                }
            }
            "register" => {
                let [name, email, username, password] = args else {
                    println!("usage: register <name> <email> <username> <password>");
                    continue;
                };
                let controller =
                    RegisterController::new(api.clone(), session.clone(), credentials.clone());
                match controller.submit(name, email, username, password).await {
                    Navigation::Dashboard => println!("Registered and logged in."),
                    _ => println!(
                        "Registration failed: {}",
                        controller.error().unwrap_or_default()
                    ),
                }
            }
            "logout" => {
                session.log_out();
                open_list = None;
                println!("Logged out.");
            }
            "whoami" => match session.current_user() {
                Some(user) => println!("{} <{}> (@{})", user.name, user.email, user.username),
                None => println!("Not logged in."),
            },
            _ => {
                // Everything below is a protected view.
                match gate.evaluate(&session) {
                    GateDecision::Allow(_) => {}
                    GateDecision::Pending => {
                        println!("Loading...");
                        continue;
                    }
                    GateDecision::RedirectToLogin | GateDecision::Denied => {
                        println!("Please log in first.");
                        continue;
                    }
                }
                run_protected(
                    command, args, &api, &credentials, &store, &session, &dashboard,
                    &mut open_list,
                )
                .await;
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_protected(
    command: &str,
    args: &[&str],
    api: &Arc<dyn Api>,
    credentials: &Arc<dyn CredentialStore>,
    store: &Arc<EntityStore>,
    session: &Arc<SessionStore>,
    dashboard: &DashboardController,
    open_list: &mut Option<TaskListController>,
) {
    match command {
        "lists" => {
            if dashboard.load().await == Navigation::Login {
                println!("Session expired; please log in again.");
                return;
            }
            dashboard.load_shared().await;
            for list in dashboard.lists() {
                println!("  #{:<4} {}", list.id, list.name);
            }
            for list in dashboard.shared_lists() {
                println!("  #{:<4} {} (shared with you)", list.id, list.name);
            }
            if let Some(error) = dashboard.error() {
                println!("Error: {error}");
            }
        }
        "new" => {
            dashboard.set_new_list_name(&args.join(" "));
            dashboard.create_list().await;
            match dashboard.error() {
                Some(error) => println!("Error: {error}"),
                None => println!("Created."),
            }
        }
        "rmlist" => {
            let Some(id) = args.first().and_then(|a| a.parse().ok()) else {
                println!("usage: rmlist <list id>");
                return;
            };
            dashboard.delete_list(id).await;
            match dashboard.error() {
                Some(error) => println!("Error: {error}"),
                None => println!("Deleted."),
            }
        }
        "open" => {
            let Some(id) = args.first().and_then(|a| a.parse().ok()) else {
                println!("usage: open <list id>");
                return;
            };
            let controller =
                TaskListController::new(api.clone(), credentials.clone(), store.clone(), id);
            if controller.load().await == Navigation::Login {
                println!("Session expired; please log in again.");
                return;
            }
            print_open_list(&controller);
            *open_list = Some(controller);
        }
        "add" | "toggle" | "rm" | "share" | "rename" => {
            let Some(controller) = open_list.as_ref() else {
                println!("No list open. Use `open <list id>` first.");
                return;
            };
            match command {
                "add" => {
                    // `add <title> | <description>`; the description part
                    // is optional.
                    let joined = args.join(" ");
                    let (title, description) = match joined.split_once('|') {
                        Some((title, description)) => (title.trim(), description.trim()),
                        None => (joined.as_str(), ""),
                    };
                    controller.set_new_task_title(title);
                    controller.set_new_task_description(description);
                    controller.add_task().await;
                }
                "toggle" => {
                    let Some(id) = args.first().and_then(|a| a.parse().ok()) else {
                        println!("usage: toggle <task id>");
                        return;
                    };
                    controller.toggle_task(id).await;
                }
                "rm" => {
                    let Some(id) = args.first().and_then(|a| a.parse().ok()) else {
                        println!("usage: rm <task id>");
                        return;
                    };
                    controller.delete_task(id).await;
                }
                "share" => {
                    let Some(username) = args.first() else {
                        println!("usage: share <username> [view|edit]");
                        return;
                    };
                    let permission = match args.get(1) {
                        Some(&"edit") => SharePermission::Edit,
                        _ => SharePermission::View,
                    };
                    controller.set_share_username(username);
                    controller.share(permission).await;
                }
                "rename" => controller.rename(&args.join(" ")).await,
                _ => unreachable!(),
            }
            match controller.error() {
                Some(error) => println!("Error: {error}"),
                None => print_open_list(controller),
            }
        }
        "profile" => {
            let [name, email, username] = args else {
                println!("usage: profile <name> <email> <username>");
                return;
            };
            let controller = ProfileController::new(api.clone(), session.clone());
            controller.set_name(name);
            controller.set_email(email);
            controller.set_username(username);
            controller.save().await;
            match controller.error() {
                Some(error) => println!("Error: {error}"),
                None => println!("Profile updated."),
            }
        }
        _ => println!("Unknown command `{command}`. Try `help`."),
    }
}

fn print_open_list(controller: &TaskListController) {
    let Some(list) = controller.list() else {
        return;
    };
    println!("{} (#{})", list.name, list.id);
    for task in list.tasks.unwrap_or_default() {
        let mark = if task.completed { "x" } else { " " };
        println!("  [{}] #{:<4} {}", mark, task.id, task.title);
    }
}

fn print_help() {
    println!("commands:");
    println!("  login <email> <password>");
    println!("  register <name> <email> <username> <password>");
    println!("  whoami");
    println!("  lists                          show your lists (and shared ones)");
    println!("  new <name>                     create a list");
    println!("  rmlist <id>                    delete a list");
    println!("  open <id>                      open a list");
    println!("  add <title> [| <description>] / toggle <id> / rm <id>");
    println!("  share <username> [view|edit]");
    println!("  rename <name>");
    println!("  profile <name> <email> <username>");
    println!("  logout / quit");
}
