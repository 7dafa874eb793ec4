mod config;
mod constants;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod types;
mod utils;
mod validations;

use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use log::info;
use std::sync::Arc;

use crate::{
    config::{
        app_config::AppConfig,
        cors::configure_cors,
        database::{connect_to_database, create_indexes},
    },
    constants::TICKET_EVENT_CAPACITY,
    errors::AppError,
    repositories::{
        category_repository::CategoryRepository, dashboard_repository::DashboardRepository,
        pricing_plan_repository::PricingPlanRepository,
        subscription_repository::SubscriptionRepository, ticket_repository::TicketRepository,
        user_activity_repository::UserActivityRepository, user_repository::UserRepository,
    },
    routes::configure_routes,
    services::{
        access_service::AccessService, activity_service::ActivityService,
        category_service::CategoryService, cleanup_service::CleanupService,
        dashboard_service::DashboardService, pricing_service::PricingService,
        stripe_service::StripeService, subscription_service::SubscriptionService,
        ticket_events::TicketEventHub, ticket_service::TicketService, user_service::UserService,
    },
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = AppConfig::from_env()?;

    let client = connect_to_database(&app_config.mongodb_uri)
        .await
        .context("Failed to connect to MongoDB")?;
    create_indexes(&client).await.context("Failed to create indexes")?;

    let user_repository = Arc::new(UserRepository::new(&client).await?);
    let dashboard_repository = Arc::new(DashboardRepository::new(&client).await?);
    let category_repository = Arc::new(CategoryRepository::new(&client).await?);
    let pricing_plan_repository = Arc::new(PricingPlanRepository::new(&client).await?);
    let subscription_repository = Arc::new(SubscriptionRepository::new(&client).await?);
    let ticket_repository = Arc::new(TicketRepository::new(&client).await?);
    let activity_repository = Arc::new(UserActivityRepository::new(&client).await?);

    let ticket_events = Arc::new(TicketEventHub::new(TICKET_EVENT_CAPACITY));
    let stripe = Arc::new(StripeService::new(app_config.stripe_secret_key.clone()));
    let activity_service = Arc::new(ActivityService::new(activity_repository));

    let user_service = Arc::new(UserService::new(
        user_repository.clone(),
        dashboard_repository.clone(),
        subscription_repository.clone(),
        &app_config,
    ));
    let dashboard_service = Arc::new(DashboardService::new(
        dashboard_repository.clone(),
        category_repository.clone(),
        pricing_plan_repository.clone(),
        user_repository.clone(),
    ));
    let category_service = Arc::new(CategoryService::new(
        category_repository.clone(),
        dashboard_repository.clone(),
    ));
    let pricing_service = Arc::new(PricingService::new(
        pricing_plan_repository.clone(),
        dashboard_repository.clone(),
    ));
    let subscription_service = Arc::new(SubscriptionService::new(
        subscription_repository.clone(),
        pricing_plan_repository.clone(),
        user_repository.clone(),
        stripe,
    ));
    let access_service = Arc::new(AccessService::new(
        user_repository.clone(),
        dashboard_repository,
        category_repository,
        subscription_repository.clone(),
        pricing_plan_repository,
        activity_service.clone(),
    ));
    let ticket_service = Arc::new(TicketService::new(ticket_repository, ticket_events.clone()));
    let cleanup_service = Arc::new(CleanupService::new(user_repository, subscription_repository));

    cleanup_service.clone().spawn_periodic(app_config.cleanup_interval_secs);

    let bind_address = (app_config.host.clone(), app_config.port);
    info!("BI portal backend listening on http://{}:{}", bind_address.0, bind_address.1);

    let config_data = web::Data::new(app_config);
    let user_service_data = web::Data::new(user_service);
    let dashboard_service_data = web::Data::new(dashboard_service);
    let category_service_data = web::Data::new(category_service);
    let pricing_service_data = web::Data::new(pricing_service);
    let subscription_service_data = web::Data::new(subscription_service);
    let access_service_data = web::Data::new(access_service);
    let ticket_service_data = web::Data::new(ticket_service);
    let ticket_events_data = web::Data::new(ticket_events);
    let activity_service_data = web::Data::new(activity_service);
    let cleanup_service_data = web::Data::new(cleanup_service);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(configure_cors(&config_data.frontend_origin))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(err.to_string()).into()
            }))
            .app_data(config_data.clone())
            .app_data(user_service_data.clone())
            .app_data(dashboard_service_data.clone())
            .app_data(category_service_data.clone())
            .app_data(pricing_service_data.clone())
            .app_data(subscription_service_data.clone())
            .app_data(access_service_data.clone())
            .app_data(ticket_service_data.clone())
            .app_data(ticket_events_data.clone())
            .app_data(activity_service_data.clone())
            .app_data(cleanup_service_data.clone())
            .configure(configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}
