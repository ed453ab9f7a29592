//! Kalyani Admin command line entry point

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use kalyani_admin::{
    AdminConfig, FileSession, HttpGateway, KindFilter, RequestsController, Session,
    SessionProvider, UnifiedRequest, ViewState,
};

const APP_NAME: &str = "KalyaniAdmin";

#[derive(Parser)]
#[command(name = "kalyani-admin", version, about = "Service request admin console")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a session obtained from the login page
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user_id: String,
    },
    /// Forget the stored session
    Logout,
    /// List service tickets and custom designs
    Requests {
        /// Match customer name, email or request id
        #[arg(long, default_value = "")]
        search: String,
        /// all, service or custom
        #[arg(long, default_value = "all")]
        kind: KindFilter,
        /// Print the filtered records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one request, e.g. ST-12 or CD-7
    Show { id: String },
    /// Change a request's status
    SetStatus { id: String, status: String },
    /// Delete a request
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AdminConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = rolling_logger::init_logger(&config.log_dir, APP_NAME) {
        eprintln!("Logging disabled: {}", e);
    }
    log::info!("Using backend {}", config.api_base_url);

    let session: Arc<dyn SessionProvider> = Arc::new(FileSession::new(&config.session_file));
    let gateway = Arc::new(HttpGateway::from_config(&config));
    let controller = RequestsController::new(gateway, Arc::clone(&session));

    match cli.command {
        Command::Login { token, user_id } => match session.store(Session::new(token, user_id)) {
            Ok(()) => {
                println!("Signed in");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        Command::Logout => {
            session.clear();
            println!("Signed out");
            ExitCode::SUCCESS
        }
        Command::Requests { search, kind, json } => {
            if controller.load().await.is_err() {
                return fail(&controller.view());
            }
            controller.set_search_term(&search);
            controller.set_kind_filter(kind);
            let view = controller.view();
            if json {
                match serde_json::to_string_pretty(&view.records) {
                    Ok(out) => println!("{}", out),
                    Err(e) => {
                        eprintln!("{}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_list(&view);
            }
            ExitCode::SUCCESS
        }
        Command::Show { id } => {
            if controller.load().await.is_err() {
                return fail(&controller.view());
            }
            match controller.request_details(&id).await {
                Ok(details) => {
                    print_request(&details.request);
                    if let Some(label) = &details.metal_label {
                        println!("Preferred metal: {}", label);
                    }
                    if !details.images.is_empty() {
                        println!("Images:          {}", details.images.len());
                    }
                    let options: Vec<&str> =
                        details.status_options.iter().map(|s| s.as_str()).collect();
                    println!("Status options:  {}", options.join(", "));
                    ExitCode::SUCCESS
                }
                Err(_) => fail(&controller.view()),
            }
        }
        Command::SetStatus { id, status } => {
            if controller.load().await.is_err() {
                return fail(&controller.view());
            }
            match controller.change_status(&id, &status).await {
                Ok(()) => succeed(&controller.view()),
                Err(_) => fail(&controller.view()),
            }
        }
        Command::Delete { id, yes } => {
            if !yes {
                eprintln!("Deleting {} cannot be undone; pass --yes to confirm", id);
                return ExitCode::FAILURE;
            }
            if controller.load().await.is_err() {
                return fail(&controller.view());
            }
            match controller.delete_request(&id).await {
                Ok(()) => succeed(&controller.view()),
                Err(_) => fail(&controller.view()),
            }
        }
    }
}

fn succeed(view: &ViewState) -> ExitCode {
    if let Some(notice) = &view.notice {
        println!("{}", notice);
    }
    ExitCode::SUCCESS
}

fn fail(view: &ViewState) -> ExitCode {
    if let Some(error) = &view.error {
        eprintln!("{}", error);
    }
    if view.login_required {
        eprintln!("Session expired, run `kalyani-admin login`");
    }
    ExitCode::FAILURE
}

fn print_list(view: &ViewState) {
    println!(
        "All ({})  Service Tickets ({})  Custom Designs ({})",
        view.counts.all, view.counts.service_tickets, view.counts.custom_designs
    );
    if view.records.is_empty() {
        println!("No requests found");
        return;
    }
    for request in &view.records {
        println!(
            "{:<8} {:<15} {:<12} {:<24} {}",
            request.id,
            request.kind.label(),
            request.status.as_str(),
            request.customer.name,
            request.submitted_at
        );
    }
}

fn print_request(request: &UnifiedRequest) {
    println!("{} ({})", request.id, request.kind.label());
    println!("Status:          {}", request.status);
    println!("Submitted:       {}", request.submitted_at);
    println!("Customer:        {}", request.customer.name);
    println!("Email:           {}", request.customer.email);
    println!("Phone:           {}", request.customer.phone);
    println!("Subject:         {}", request.subject);
    println!("Description:     {}", request.description);
    if let Some(notes) = &request.notes {
        println!("Notes:           {}", notes);
    }
}
