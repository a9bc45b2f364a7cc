// src/main.rs - terminal front end wiring the page controllers together
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use uuid::Uuid;

use cabstock::api::ApiClient;
use cabstock::config::{load_config, Config};
use cabstock::controllers::{
    DashboardController, HistoryController, PrintController, ReportsController, ScanDevice,
    ScannerController, UserForm, UsersController,
};
use cabstock::error::{ApiError, ApiResult};
use cabstock::models::{Container, CreateContainerRequest, Role};
use cabstock::qr::QrSize;
use cabstock::session::{self, Page, Session, TokenStore};
use cabstock::shell::Shell;
use cabstock::views::SortKey;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    setup_logging(&config);
    config.print_startup_info();

    let store = TokenStore::open(&config.session.token_file);
    let api = ApiClient::new(&config.api.base_url, store.clone());
    let mut session = Session::new(store);

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if session.restore().is_none() {
        login_prompt(&api, &mut session, &mut input).await?;
    }
    let identity = session
        .identity()
        .cloned()
        .context("No session after login")?;
    println!("Signed in as {} ({})", identity.username, identity.role.display_name());

    let mut shell = Shell::new(api.clone(), identity.role);
    shell.start_notifications(Duration::from_secs(config.notifications.poll_interval_secs));

    // Each role lands on its home page: operators scan, administrators manage.
    let logout = match session::home_page(identity.role) {
        Page::Scanner => run_operator(&api, &mut input).await?,
        _ => run_admin(&api, &shell, &mut input).await?,
    };

    shell.stop_notifications();
    if logout {
        session.logout();
    }
    Ok(())
}

fn setup_logging(config: &Config) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();
}

async fn login_prompt(
    api: &ApiClient,
    session: &mut Session,
    input: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    loop {
        let username = ask(input, "Username: ").await?;
        let password = ask(input, "Password: ").await?;
        match session.login(api, &username, &password).await {
            Ok(_) => return Ok(()),
            Err(err) => println!("Login failed: {}", err),
        }
    }
}

async fn ask(input: &mut Lines<BufReader<Stdin>>, prompt: &str) -> anyhow::Result<String> {
    use std::io::Write;
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let line = input
        .next_line()
        .await?
        .context("Input closed")?;
    Ok(line.trim().to_string())
}

// ==================== OPERATOR LOOP ====================

/// Stand-in for the camera collaborator: payloads arrive as typed lines
/// (a USB scanner in keyboard mode produces exactly that).
struct ConsoleScanDevice;

impl ScanDevice for ConsoleScanDevice {
    fn start(&mut self) {
        log::debug!("Scan capture armed");
    }
    fn stop(&mut self) {
        log::debug!("Scan capture stopped");
    }
}

async fn run_operator(
    api: &ApiClient,
    input: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<bool> {
    let mut scanner = ScannerController::new(api.clone(), ConsoleScanDevice);
    println!("Commands: scan <payload> | writeoff <amount> | rescan | logout | quit");

    loop {
        let line = ask(input, "> ").await?;
        let (command, rest) = split_command(&line);
        match command {
            "scan" => {
                scanner.handle_decode(rest).await;
                if let Some(message) = scanner.message() {
                    println!("{}", message);
                }
                if let Some(container) = scanner.container() {
                    print_container(container);
                }
            }
            "writeoff" => match rest.parse::<f64>() {
                Ok(amount) => {
                    let result = scanner.write_off(amount).await;
                    if result.is_ok() {
                        if let Some(container) = scanner.container() {
                            print_container(container);
                        }
                    }
                    if let Some(message) = scanner.message() {
                        println!("{}", message);
                    }
                    if let Err(err) = result {
                        if err.requires_relogin() {
                            println!("Session no longer valid, exiting");
                            scanner.teardown();
                            return Ok(true);
                        }
                    }
                }
                Err(_) => println!("Enter a valid amount to write off"),
            },
            "rescan" => {
                scanner.rescan();
                println!("Ready for the next scan");
            }
            "logout" => {
                scanner.teardown();
                return Ok(true);
            }
            "quit" | "exit" => {
                scanner.teardown();
                return Ok(false);
            }
            "" => {}
            other => println!("Unknown command: {}", other),
        }
    }
}

// ==================== ADMINISTRATOR LOOP ====================

async fn run_admin(
    api: &ApiClient,
    shell: &Shell,
    input: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<bool> {
    let mut dashboard = DashboardController::new(api.clone());
    if let Err(err) = dashboard.load().await {
        println!("Failed to load cabinets: {}", err);
    }
    let mut history = HistoryController::new(api.clone());
    let mut users = UsersController::new(api.clone());
    let mut reports = ReportsController::new(api.clone());
    let mut print_page = PrintController::new(api.clone());
    let mut history_loaded = false;

    println!(
        "Commands: cabinets | select <id> | containers | search <term> | add-cabinet <name> | \
         del-cabinet <id> | add-container <name> <unit> <initial> <current> <threshold> | \
         del-container <uuid> | replenish <uuid> <amount> | qr <uuid> <file> | history | \
         sort <time|quantity> | filter <term> | users | add-user <name> <password> <role> | \
         del-user <id> | report [cabinet-id] | export [dir] | print [small|medium|large] | \
         notifications | logout | quit"
    );

    loop {
        let line = ask(input, "> ").await?;
        let (command, rest) = split_command(&line);
        let result = match command {
            "cabinets" => {
                for cabinet in dashboard.cabinets() {
                    println!(
                        "{:>4}  {} ({} containers)",
                        cabinet.id,
                        cabinet.name,
                        cabinet.containers.len()
                    );
                }
                Ok(())
            }
            "select" => match rest.parse::<i64>() {
                Ok(id) => {
                    dashboard.select_cabinet(id);
                    Ok(())
                }
                Err(_) => {
                    println!("Usage: select <cabinet-id>");
                    Ok(())
                }
            },
            "containers" => {
                match dashboard.selected_cabinet() {
                    Some(cabinet) => {
                        println!("Cabinet: {}", cabinet.name);
                        for container in &cabinet.containers {
                            print_container(container);
                        }
                        let low = dashboard.low_stock_in_selected();
                        if !low.is_empty() {
                            println!("{} container(s) at or below threshold", low.len());
                        }
                    }
                    None => println!("No cabinet selected"),
                }
                Ok(())
            }
            "search" => {
                dashboard.set_search_term(rest);
                for cabinet in dashboard.visible_cabinets() {
                    println!("{:>4}  {}", cabinet.id, cabinet.name);
                }
                Ok(())
            }
            "add-cabinet" => dashboard.create_cabinet(rest).await,
            "del-cabinet" => match rest.parse::<i64>() {
                Ok(id) => dashboard.delete_cabinet(id).await,
                Err(_) => {
                    println!("Usage: del-cabinet <cabinet-id>");
                    Ok(())
                }
            },
            "add-container" => add_container(&mut dashboard, rest).await,
            "del-container" => match rest.parse::<Uuid>() {
                Ok(id) => dashboard.delete_container(id).await,
                Err(_) => {
                    println!("Usage: del-container <uuid>");
                    Ok(())
                }
            },
            "replenish" => {
                let mut parts = rest.split_whitespace();
                match (
                    parts.next().and_then(|s| s.parse::<Uuid>().ok()),
                    parts.next().and_then(|s| s.parse::<f64>().ok()),
                ) {
                    (Some(id), Some(amount)) => dashboard.replenish_container(id, amount).await,
                    _ => {
                        println!("Usage: replenish <uuid> <amount>");
                        Ok(())
                    }
                }
            }
            "qr" => {
                let mut parts = rest.split_whitespace();
                match (parts.next().and_then(|s| s.parse::<Uuid>().ok()), parts.next()) {
                    (Some(id), Some(file)) => match dashboard.qr_image(id).await {
                        Ok(bytes) => match std::fs::write(file, bytes) {
                            Ok(()) => {
                                println!("QR saved to {}", file);
                                Ok(())
                            }
                            Err(e) => Err(ApiError::ExportError(e.to_string())),
                        },
                        Err(err) => Err(err),
                    },
                    _ => {
                        println!("Usage: qr <uuid> <file.png>");
                        Ok(())
                    }
                }
            }
            "history" => {
                let loaded = if history_loaded {
                    Ok(())
                } else {
                    history.load().await
                };
                match loaded {
                    Ok(()) => {
                        history_loaded = true;
                        print_history(&history);
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
            "sort" => {
                match rest {
                    "time" | "timestamp" => history.request_sort(SortKey::Timestamp),
                    "quantity" => history.request_sort(SortKey::QuantityChange),
                    _ => println!("Usage: sort <time|quantity>"),
                }
                print_history(&history);
                Ok(())
            }
            "filter" => {
                history.set_material_filter(rest);
                print_history(&history);
                Ok(())
            }
            "users" => match users.load().await {
                Ok(()) => {
                    for user in users.users() {
                        println!(
                            "{:>4}  {:<20} {:<14} staff: {}",
                            user.id,
                            user.username,
                            user.role.display_name(),
                            user.is_staff
                        );
                    }
                    Ok(())
                }
                Err(err) => Err(err),
            },
            "add-user" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(name), Some(password), Some(role_str)) => {
                        let role = Role::from_str(role_str).unwrap_or(Role::Operator);
                        let form = UserForm {
                            id: None,
                            username: name.to_string(),
                            password: password.to_string(),
                            role,
                            is_staff: role.is_administrator(),
                        };
                        users.save(&form).await
                    }
                    _ => {
                        println!("Usage: add-user <name> <password> <operator|administrator>");
                        Ok(())
                    }
                }
            }
            "del-user" => match rest.parse::<i64>() {
                Ok(id) => users.delete(id).await,
                Err(_) => {
                    println!("Usage: del-user <user-id>");
                    Ok(())
                }
            },
            "report" => {
                let cabinet_id = rest.parse::<i64>().ok();
                match reports.load(cabinet_id).await {
                    Ok(()) => {
                        print_report(&reports);
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
            "export" => {
                let dir = if rest.is_empty() { "." } else { rest };
                match reports.export(Path::new(dir)) {
                    Ok(path) => {
                        println!("Exported to {}", path.display());
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
            "print" => {
                if let Some(size) = QrSize::from_str(rest) {
                    print_page.set_size(size);
                }
                match print_page.load().await {
                    Ok(()) => {
                        for card in print_page.cards() {
                            println!("[{}px] {}  ->  {}", card.size_px, card.name, card.payload);
                        }
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
            "notifications" => {
                println!("Low stock: {} item(s)", shell.badge_count());
                for item in shell.notifications() {
                    println!(
                        "  {} in \"{}\" ({:.2} / {})",
                        item.name, item.cabinet_name, item.current_quantity, item.low_stock_threshold
                    );
                }
                Ok(())
            }
            "logout" => return Ok(true),
            "quit" | "exit" => return Ok(false),
            "" => Ok(()),
            other => {
                println!("Unknown command: {}", other);
                Ok(())
            }
        };

        if let Err(err) = result {
            println!("{}", err);
            if err.requires_relogin() {
                println!("Session no longer valid, exiting");
                return Ok(true);
            }
        }
    }
}

async fn add_container(dashboard: &mut DashboardController, rest: &str) -> ApiResult<()> {
    let cabinet_id = match dashboard.selected_cabinet() {
        Some(cabinet) => cabinet.id,
        None => {
            println!("Select a cabinet first");
            return Ok(());
        }
    };
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let parsed = match parts.as_slice() {
        [name, unit, initial, current, threshold] => {
            match (
                initial.parse::<f64>(),
                current.parse::<f64>(),
                threshold.parse::<f64>(),
            ) {
                (Ok(initial), Ok(current), Ok(threshold)) => {
                    Some((name.to_string(), unit.to_string(), initial, current, threshold))
                }
                _ => None,
            }
        }
        _ => None,
    };
    match parsed {
        Some((name, unit, initial_quantity, current_quantity, low_stock_threshold)) => {
            dashboard
                .create_container(CreateContainerRequest {
                    cabinet: cabinet_id,
                    name,
                    unit,
                    initial_quantity,
                    current_quantity,
                    low_stock_threshold,
                })
                .await
        }
        None => {
            println!("Usage: add-container <name> <unit> <initial> <current> <threshold>");
            Ok(())
        }
    }
}

// ==================== OUTPUT HELPERS ====================

fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    }
}

fn print_container(container: &Container) {
    let percentage = container.fill_percentage();
    let marker = if container.is_low_stock() { "  LOW" } else { "" };
    println!(
        "{}  {}  {:.2} {} of {:.2} ({:.0}%, {:?}){}",
        container.id,
        container.name,
        container.current_quantity,
        container.unit,
        container.initial_quantity,
        percentage,
        container.fill_level(),
        marker
    );
}

fn print_history(history: &HistoryController) {
    for t in history.rows() {
        let change = if t.quantity_change > 0.0 {
            format!("+{}", t.quantity_change)
        } else {
            format!("{}", t.quantity_change)
        };
        println!(
            "{}  {:<12} {:<25} {:>10}  {}",
            t.timestamp.format("%Y-%m-%d %H:%M:%S"),
            t.transaction_type.label(),
            t.container_name,
            change,
            t.user.as_deref().unwrap_or("N/A")
        );
    }
}

fn print_report(reports: &ReportsController) {
    let Some(report) = reports.report() else {
        return;
    };
    if let Some(total_cabinets) = report.total_cabinets {
        println!("Cabinets: {}", total_cabinets);
    }
    println!("Containers: {}", report.total_containers);
    println!("Materials:");
    for row in &report.materials_summary {
        println!("  {:<25} {:.2} {}", row.name, row.total_quantity, row.unit);
    }
    println!("Low stock:");
    for item in &report.low_stock_items {
        println!(
            "  {:<25} {:<15} {:.2} / {} {}",
            item.name, item.cabinet_name, item.current_quantity, item.low_stock_threshold, item.unit
        );
    }
}
