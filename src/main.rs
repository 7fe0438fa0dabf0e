use andersen_controller::backend::sync_desired_mode;
use andersen_controller::cli::{Args, Command};
use andersen_controller::config::load_config;
use andersen_controller::error::AppError;
use andersen_controller::logging::init_logging;
use andersen_controller::routes;
use andersen_controller::state::{connect_controller, shadow_store, AppState};
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[rocket::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = load_config(&args.config)?;
    init_logging(&config.logging);

    match args.command {
        Command::Serve => {
            let app_state = AppState::from_config(&config).await?;
            let _rocket = rocket::build()
                .mount("/", routes::charge_mode::routes())
                .mount("/", routes::events::routes())
                .manage(Arc::new(app_state))
                .launch()
                .await?;
        }
        Command::Set { mode } => {
            let app_state = AppState::from_config(&config).await?;
            let message = app_state.set_mode(mode).await;
            println!("{message}");
        }
        Command::Get => {
            let app_state = AppState::from_config(&config).await?;
            let (_, message) = app_state.describe_mode().await;
            println!("{message}");
        }
        Command::Schedule => {
            let app_state = AppState::from_config(&config).await?;
            let response = app_state.run_schedule(Utc::now()).await;
            println!("{}", response.body);
        }
        Command::Sync => {
            config.andersen.validate()?;
            let store = shadow_store(&config.shadow);
            let controller = connect_controller(&config.andersen).await?;
            let transition = sync_desired_mode(&store, &controller).await;
            info!(target: "app", ?transition, "Sync finished");
        }
    }

    Ok(())
}
