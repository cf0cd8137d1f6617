//! Supplier Portal CLI
//!
//! Command-line front end for the procurement portal:
//! - Sign in, register and sign out
//! - Browse open requests and submit quotes
//! - Manage supplier documents
//! - Admin console (approvals, compliance, SMTP settings, reset, ERP import)

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use supplier_portal::config::{generate_default_config, Config, LoadReport, LoggingConfig};
use supplier_portal::guard::{Navigation, Route, RouteGuard};
use supplier_portal::models::{
    load_erp_file, resolve_upload_url, shorten_document_name, ComplianceFlag, EmailConfig,
    Supplier,
};
use supplier_portal::session::{FileStore, Session};
use supplier_portal::views::{
    sync_theme, AdminView, Confirmer, DashboardView, LoginView, Notifier, RegisterForm,
    RegisterView, RequestGate, Slot, ViewContext, DEFAULT_ATTACHMENT, DEFAULT_DELIVERY,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "supplier-portal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Supplier portal client for procurement requests and quotes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Portal backend URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in as a supplier or administrator
    Login {
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Register a new supplier account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        contact: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Confirmation (prompted when omitted)
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the stored session
    Whoami,

    /// Refresh the UI theme from the backend
    Theme,

    /// Show login branding
    Branding,

    /// Supplier dashboard
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommand,
    },

    /// Admin console
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum DashboardCommand {
    /// List open requests
    Requests,

    /// Quote a request
    Quote {
        request_id: i32,
        #[arg(long)]
        price: String,
        #[arg(long, default_value = DEFAULT_DELIVERY)]
        delivery: String,
        #[arg(long, default_value = DEFAULT_ATTACHMENT)]
        attachment: String,
        #[arg(long, default_value = "")]
        photo: String,
    },

    /// Show the document list
    Docs,

    /// Replace the document list (comma-separated names)
    SaveDocs { documents: String },

    /// Upload a file and add it to the document list
    Upload { path: PathBuf },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Supplier counters
    Overview,

    /// Suppliers waiting for approval
    Pending,

    /// Approved suppliers with compliance flags
    Directory,

    /// All offers
    Offers,

    /// All procurement requests
    Products,

    /// Approve a pending supplier
    Approve { id: i32 },

    /// Reject and delete a pending supplier
    Reject { id: i32 },

    /// Set a compliance flag (reviewed, approved, audited)
    Compliance {
        id: i32,
        flag: ComplianceFlag,
        /// Clear the flag instead of setting it
        #[arg(long)]
        off: bool,
    },

    /// Show SMTP and branding settings
    ConfigShow,

    /// Update SMTP and branding settings
    ConfigSave(EmailArgs),

    /// Send a test email with the stored settings (plus overrides)
    ConfigTest(EmailArgs),

    /// Delete all suppliers, requests and offers
    Reset,

    /// Push generated test items through the ERP endpoint
    ErpSimulate {
        #[arg(long)]
        count: Option<usize>,
    },

    /// Import ERP items from a JSON or CSV file
    ErpImport { path: PathBuf },
}

/// Email settings overrides; unset fields keep the stored value
#[derive(Args, Debug, Default)]
pub struct EmailArgs {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<i32>,
    #[arg(long)]
    user: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    theme: Option<String>,
    #[arg(long)]
    login_image: Option<String>,
}

impl EmailArgs {
    fn apply(self, mut config: EmailConfig) -> EmailConfig {
        if let Some(host) = self.host {
            config.smtp_host = host;
        }
        if let Some(port) = self.port {
            config.smtp_port = port;
        }
        if let Some(user) = self.user {
            config.smtp_user = user;
        }
        if let Some(password) = self.password {
            config.smtp_password = password;
        }
        if let Some(from) = self.from {
            config.smtp_from = from;
        }
        if let Some(theme) = self.theme {
            config.ui_theme = Some(theme);
        }
        if let Some(image) = self.login_image {
            config.login_image_url = Some(image);
        }
        config
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        println!("{}", message);
    }
}

struct ConsoleConfirmer {
    assume_yes: bool,
}

impl Confirmer for ConsoleConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            tracing::debug!(prompt, "Confirmation answered by --yes");
            return true;
        }
        match prompt_line(&format!("{} [y/N]", prompt)) {
            Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

fn prompt_line(prompt: &str) -> std::io::Result<String> {
    eprint!("{} ", prompt);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("supplier_portal={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<(Config, LoadReport)> {
    let (mut config, report) = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok((config, report))
}

/// Run the route guard; a redirect aborts the command
fn enter(guard: &RouteGuard, session: &Session, route: Route) -> anyhow::Result<()> {
    match guard.navigate(route, session) {
        Navigation::Allow(_) => Ok(()),
        Navigation::Redirect(Route::Dashboard) if route != Route::Admin => {
            let name = session.supplier_name().unwrap_or_default();
            bail!("Already signed in as {}; run `logout` first", name)
        }
        Navigation::Redirect(Route::Login) => bail!("Not signed in; run `login` first"),
        Navigation::Redirect(_) => bail!(
            "Admin access denied (policy: {:?})",
            guard.policy()
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, report) = load_config(&cli)?;
    init_logging(&config.logging);
    report.log();

    if let Commands::Config { output } = &cli.command {
        let template = generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &template)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    tracing::debug!(base_url = %config.api.base_url, "Supplier Portal v{}", env!("CARGO_PKG_VERSION"));

    let store = FileStore::open(&config.session.path)
        .with_context(|| format!("opening session file {}", config.session.path))?;
    let session = Session::new(Arc::new(store));
    let api = supplier_portal::api::connect(&config.api.base_url, config.api.timeout())?;
    let guard = RouteGuard::new(config.guard.admin_policy);
    let ctx = ViewContext::new(
        api,
        session.clone(),
        Arc::new(ConsoleNotifier),
        Arc::new(ConsoleConfirmer {
            assume_yes: cli.yes,
        }),
    );

    match cli.command {
        Commands::Login { email, password } => {
            enter(&guard, &session, Route::Login)?;
            let password = match password {
                Some(p) => p,
                None => prompt_line("Password:")?,
            };

            let view = LoginView::new(ctx);
            match view.submit(&email, &password).await {
                Ok(next) => {
                    println!(
                        "Signed in as {} ({})",
                        session.supplier_name().unwrap_or_default(),
                        session.role().as_str()
                    );
                    println!("Continue with: {}", next);
                }
                Err(e) => bail!(view.error().unwrap_or_else(|| e.to_string())),
            }
        }

        Commands::Register {
            name,
            contact,
            email,
            phone,
            password,
            confirm_password,
        } => {
            enter(&guard, &session, Route::Register)?;
            let password = match password {
                Some(p) => p,
                None => prompt_line("Password:")?,
            };
            let confirm_password = match confirm_password {
                Some(p) => p,
                None => prompt_line("Confirm password:")?,
            };

            let form = RegisterForm {
                name,
                contact,
                email,
                phone,
                password,
                confirm_password,
            };
            RegisterView::new(ctx).submit(&form).await?;
        }

        Commands::Logout => {
            let next = DashboardView::new(ctx).logout()?;
            println!("Signed out. Continue with: {}", next);
        }

        Commands::Whoami => {
            if !session.has_token() {
                println!("Not signed in");
            } else {
                println!("Name:        {}", session.supplier_name().unwrap_or_default());
                println!("Supplier ID: {}", session.supplier_id_raw().unwrap_or_default());
                println!("Role:        {}", session.role().as_str());
            }
            println!("Theme:       {}", session.theme());
        }

        Commands::Theme => {
            println!("{}", sync_theme(&ctx).await);
        }

        Commands::Branding => {
            let view = LoginView::new(ctx);
            view.mount().await;
            match view.branding() {
                Slot::Ready(branding) => {
                    println!(
                        "Logo:  {}",
                        branding.image_url.as_deref().unwrap_or("(none)")
                    );
                    println!("Theme: {}", branding.theme.as_deref().unwrap_or("(none)"));
                }
                Slot::Failed(e) => println!("Branding unavailable: {}", e),
                Slot::Loading => println!("Loading..."),
            }
        }

        Commands::Dashboard { command } => {
            enter(&guard, &session, Route::Dashboard)?;
            run_dashboard(ctx, command).await?;
        }

        Commands::Admin { command } => {
            enter(&guard, &session, Route::Admin)?;
            run_admin(ctx, &config, command).await?;
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

async fn run_dashboard(ctx: ViewContext, command: DashboardCommand) -> anyhow::Result<()> {
    let view = DashboardView::new(ctx);
    view.mount().await;

    match command {
        DashboardCommand::Requests => {
            if let Some(name) = view.supplier_name() {
                println!("Supplier: {}", name);
                println!();
            }
            if let Slot::Failed(e) = view.requests() {
                println!("Could not load requests: {}", e);
            }

            match view.request_gate() {
                RequestGate::Loading => println!("Loading..."),
                RequestGate::PendingReview => {
                    println!("Your account is pending review.");
                    println!("Open requests become visible once an administrator reviews it.");
                }
                RequestGate::Open(requests) if requests.is_empty() => {
                    println!("No open requests.")
                }
                RequestGate::Open(requests) => {
                    println!(
                        "{:<6} {:<30} {:>8} {:<10} {:<20} {}",
                        "ID", "Title", "Qty", "Units", "Deadline", "Quoted"
                    );
                    println!("{}", "-".repeat(86));
                    for request in &requests {
                        println!(
                            "{:<6} {:<30} {:>8} {:<10} {:<20} {}",
                            request.id,
                            request.title,
                            request.quantity,
                            request.units,
                            request.deadline.format("%Y-%m-%d %H:%M"),
                            if view.is_quoted(request.id) { "yes" } else { "" }
                        );
                    }
                }
            }

            let unconfirmed = view.unconfirmed_quotes();
            if !unconfirmed.is_empty() {
                println!();
                println!("Quoted locally, not yet confirmed by the portal: {:?}", unconfirmed);
            }
        }

        DashboardCommand::Quote {
            request_id,
            price,
            delivery,
            attachment,
            photo,
        } => {
            if !view.is_reviewed() {
                bail!("Your account is pending review; quotes are not accepted yet");
            }
            if view.is_quoted(request_id) {
                bail!("Request {} is already quoted", request_id);
            }

            let mut form = view.start_quoting(request_id);
            form.price = price;
            form.delivery_time = delivery;
            form.attachments = attachment;
            form.photo = photo;

            view.submit_quote(request_id, &form).await?;
        }

        DashboardCommand::Docs => print_documents(&view),

        DashboardCommand::SaveDocs { documents } => {
            view.set_documents(documents);
            view.save_documents().await?;
            print_documents(&view);
        }

        DashboardCommand::Upload { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading {:?}", path))?;
            let file_name = file_name(&path)?;
            let stored = view.upload_document(&file_name, bytes).await?;
            if view.documents_loaded() {
                view.save_documents().await?;
            } else {
                tracing::warn!(file = %stored, "Profile unavailable, document list not saved");
                println!(
                    "Uploaded as {}, but the profile could not be loaded; \
                     the stored document list was left unchanged.",
                    stored
                );
            }
            print_documents(&view);
        }
    }

    Ok(())
}

fn print_documents(view: &DashboardView) {
    let names = view.document_names();
    if names.is_empty() {
        println!("No documents.");
        return;
    }
    for name in names {
        println!("  {}", name);
    }
}

fn file_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("no file name in {:?}", path))
}

async fn run_admin(ctx: ViewContext, config: &Config, command: AdminCommand) -> anyhow::Result<()> {
    let base_url = ctx.api.base_url().to_string();
    let view = AdminView::new(ctx, config.erp.api_key.clone());

    match command {
        AdminCommand::Overview => {
            view.mount().await;
            let stats = view.stats();
            println!("Suppliers: {}", stats.total);
            println!("  Pending: {}", stats.pending);
            println!("  Active:  {}", stats.active);
            println!("Offers:    {}", view.offers().items().len());
            println!("Requests:  {}", view.requests().items().len());
        }

        AdminCommand::Pending => {
            view.refresh_suppliers().await;
            print_suppliers(&view, &view.pending(), false);
        }

        AdminCommand::Directory => {
            view.refresh_suppliers().await;
            print_suppliers(&view, &view.approved(), true);
        }

        AdminCommand::Offers => {
            view.refresh_offers().await;
            match view.offers() {
                Slot::Failed(e) => bail!("Could not load offers: {}", e),
                Slot::Ready(offers) if offers.is_empty() => println!("No offers."),
                slot => {
                    println!(
                        "{:<6} {:<9} {:<8} {:>12} {:<15} {:<10} {}",
                        "ID", "Supplier", "Request", "Price", "Delivery", "Status", "Winner"
                    );
                    println!("{}", "-".repeat(72));
                    for offer in slot.items() {
                        println!(
                            "{:<6} {:<9} {:<8} {:>12.2} {:<15} {:<10} {}",
                            offer.id,
                            offer.supplier_id,
                            offer.request_id,
                            offer.price,
                            offer.delivery_time,
                            offer.status,
                            if offer.is_winner() { "*" } else { "" }
                        );
                    }
                }
            }
        }

        AdminCommand::Products => {
            view.refresh_requests().await;
            match view.requests() {
                Slot::Failed(e) => bail!("Could not load requests: {}", e),
                Slot::Ready(requests) if requests.is_empty() => println!("No requests."),
                slot => {
                    println!(
                        "{:<6} {:<30} {:>8} {:<10} {:<10} {}",
                        "ID", "Title", "Qty", "Units", "Status", "ERP"
                    );
                    println!("{}", "-".repeat(80));
                    for request in slot.items() {
                        println!(
                            "{:<6} {:<30} {:>8} {:<10} {:<10} {}",
                            request.id,
                            request.title,
                            request.quantity,
                            request.units,
                            request.status,
                            request.origin_erp
                        );
                    }
                }
            }
        }

        AdminCommand::Approve { id } => view.approve(id).await?,

        AdminCommand::Reject { id } => view.reject(id).await?,

        AdminCommand::Compliance { id, flag, off } => {
            view.refresh_suppliers().await;
            view.set_compliance(id, flag, !off).await?;
            print_suppliers(&view, &view.approved(), true);
        }

        AdminCommand::ConfigShow => {
            view.refresh_config().await;
            match view.config() {
                Slot::Ready(email) => print_email_config(&email, &base_url),
                Slot::Failed(e) => bail!("Could not load email config: {}", e),
                Slot::Loading => println!("Loading..."),
            }
        }

        AdminCommand::ConfigSave(args) => {
            let current = stored_email_config(&view).await?;
            view.save_config(args.apply(current)).await?;
            if let Slot::Ready(saved) = view.config() {
                print_email_config(&saved, &base_url);
            }
        }

        AdminCommand::ConfigTest(args) => {
            let current = stored_email_config(&view).await?;
            let result = view.test_config(&args.apply(current)).await;
            for line in view.activity().lines().iter().rev() {
                println!("{}", line);
            }
            result?;
        }

        AdminCommand::Reset => view.reset().await?,

        AdminCommand::ErpSimulate { count } => {
            let count = count.unwrap_or(config.erp.simulate_count);
            let response = view.simulate_erp(count).await?;
            println!("Processed: {}", response.processed);
        }

        AdminCommand::ErpImport { path } => {
            let items = load_erp_file(&path).with_context(|| format!("reading {:?}", path))?;
            println!("Read {} items from {:?}", items.len(), path);
            let response = view.import_erp(&items).await?;
            println!("Processed: {}", response.processed);
        }
    }

    Ok(())
}

async fn stored_email_config(view: &AdminView) -> anyhow::Result<EmailConfig> {
    view.refresh_config().await;
    match view.config() {
        Slot::Ready(config) => Ok(config),
        Slot::Failed(e) => bail!("Could not load email config: {}", e),
        Slot::Loading => bail!("Email config not loaded"),
    }
}

fn print_suppliers(view: &AdminView, slot: &Slot<Vec<Supplier>>, compliance: bool) {
    let suppliers = match slot {
        Slot::Ready(suppliers) => suppliers,
        Slot::Failed(e) => {
            println!("Could not load suppliers: {}", e);
            return;
        }
        Slot::Loading => {
            println!("Loading...");
            return;
        }
    };

    if suppliers.is_empty() {
        println!("No suppliers.");
        return;
    }

    for supplier in suppliers {
        print!(
            "{:<5} {:<25} {:<28} {:<14} {}",
            supplier.id,
            supplier.name,
            supplier.email,
            supplier.phone,
            supplier.created_at.format("%Y-%m-%d")
        );
        if compliance {
            let mark = |on: bool| if on { "x" } else { " " };
            print!(
                "  [{}] reviewed [{}] approved [{}] audited",
                mark(supplier.is_reviewed),
                mark(supplier.is_approved),
                mark(supplier.is_audited)
            );
        }
        println!();
        for (label, url) in view.document_links(supplier) {
            println!("        {} <{}>", label, url);
        }
    }
}

fn print_email_config(config: &EmailConfig, base_url: &str) {
    println!("SMTP host:   {}", config.smtp_host);
    println!("SMTP port:   {}", config.smtp_port);
    println!("SMTP user:   {}", config.smtp_user);
    println!(
        "Password:    {}",
        if config.smtp_password.is_empty() {
            "(not set)"
        } else {
            "(stored)"
        }
    );
    println!("From:        {}", config.smtp_from);
    println!("Theme:       {}", config.ui_theme.as_deref().unwrap_or("(default)"));
    match config.login_image_url.as_deref().filter(|u| !u.is_empty()) {
        Some(image) => println!(
            "Login image: {} <{}>",
            shorten_document_name(image),
            resolve_upload_url(base_url, image)
        ),
        None => println!("Login image: (none)"),
    }
}
