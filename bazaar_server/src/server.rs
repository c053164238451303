use std::{path::Path, time::Duration};

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    error::{JsonPayloadError, PathError, QueryPayloadError},
    http::{header, KeepAlive},
    middleware::Logger,
    web,
    App,
    Error,
    HttpRequest,
    HttpServer,
};
use bazaar_engine::{
    db_types::NewAdmin,
    events::{EventHandlers, EventHooks, EventProducers},
    AccountApi,
    AuthApi,
    CartApi,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
};
use futures::FutureExt;
use log::*;

use crate::{
    auth::{hash_password, TokenIssuer},
    config::{AdminBootstrap, ServerConfig},
    errors::ServerError,
    middleware::JwtMiddlewareFactory,
    routes::{
        health,
        not_found,
        AddProductRoute,
        AddToCartRoute,
        AdjustCartItemRoute,
        AdminLoginRoute,
        BrowseProductsRoute,
        CustomerLoginRoute,
        CustomerSignupRoute,
        CustomersRoute,
        DeleteCustomerRoute,
        DeleteMerchantRoute,
        DeleteProductRoute,
        EditProductRoute,
        MerchantLoginRoute,
        MerchantOrdersRoute,
        MerchantSignupRoute,
        MerchantsRoute,
        MyProductsRoute,
        OrderHistoryRoute,
        PlaceOrderRoute,
        RemoveCartItemRoute,
        ViewCartRoute,
        ViewOrderRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    ensure_db_directory(&config.database_url)?;
    let db = SqliteDatabase::new_with_options(&config.database_url, config.db_max_connections, config.db_timeout)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    } else {
        warn!("🗃️ Database migrations are disabled. Make sure the schema is up to date.");
    }
    if let Some(admin) = &config.admin {
        seed_admin(&db, admin).await?;
    }
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, default_event_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db.clone(), producers)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("🗃️ Closing the database");
    db.close().await;
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let issuer = TokenIssuer::new(&config.auth);
    let cors_origin = config.cors_origin.clone();
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let cart_api = CartApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let api_scope = web::scope("/api")
            .service(AdminLoginRoute::<SqliteDatabase>::new())
            .service(CustomerSignupRoute::<SqliteDatabase>::new())
            .service(CustomerLoginRoute::<SqliteDatabase>::new())
            .service(MerchantSignupRoute::<SqliteDatabase>::new())
            .service(MerchantLoginRoute::<SqliteDatabase>::new())
            .service(CustomersRoute::<SqliteDatabase>::new())
            .service(MerchantsRoute::<SqliteDatabase>::new())
            .service(DeleteCustomerRoute::<SqliteDatabase>::new())
            .service(DeleteMerchantRoute::<SqliteDatabase>::new())
            .service(BrowseProductsRoute::<SqliteDatabase>::new())
            .service(ViewCartRoute::<SqliteDatabase>::new())
            .service(AddToCartRoute::<SqliteDatabase>::new())
            .service(AdjustCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(ViewOrderRoute::<SqliteDatabase>::new())
            .service(OrderHistoryRoute::<SqliteDatabase>::new())
            .service(MyProductsRoute::<SqliteDatabase>::new())
            .service(AddProductRoute::<SqliteDatabase>::new())
            .service(EditProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(MerchantOrdersRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(JwtMiddlewareFactory::new(issuer.clone()))
            .wrap(cors(&cors_origin))
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bazaar::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(issuer.clone()))
            .configure(extractor_config)
            .service(health)
            .service(api_scope)
            .default_service(web::to(not_found))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("💻️ Listening on {}:{}", config.host, config.port);
    Ok(srv)
}

/// Malformed bodies, paths and query strings are reported in the same JSON envelope as every other error.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .app_data(web::QueryConfig::default().error_handler(query_error));
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    debug!("💻️ Rejected request body. {err}");
    ServerError::InvalidRequestBody(err.to_string()).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> Error {
    debug!("💻️ Rejected request path. {err}");
    ServerError::InvalidRequestPath(err.to_string()).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    debug!("💻️ Rejected query string. {err}");
    ServerError::ValidationError(format!("Invalid query string. {err}")).into()
}

fn cors(origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(origin)
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600)
}

/// Hooks that run for every server instance. For now these only write an audit trail to the log.
pub fn default_event_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_order_created(|ev| {
        async move {
            let order = ev.order;
            info!(
                "📬️ {} created for {}: {} lines, total {}",
                order.id,
                order.customer_id,
                order.lines.len(),
                order.total_price
            );
        }
        .boxed()
    });
    hooks
}

async fn seed_admin(db: &SqliteDatabase, admin: &AdminBootstrap) -> Result<(), ServerError> {
    let password = admin.password.reveal().clone();
    let password_hash = web::block(move || hash_password(&password))
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))??;
    let api = AuthApi::new(db.clone());
    let new_admin = NewAdmin { name: admin.name.clone(), email: admin.email.clone(), password_hash };
    let admin = api.upsert_admin(new_admin).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🔐️ Admin account {} is ready to log in", admin.email);
    Ok(())
}

/// SQLite creates a missing database file, but not the directory it lives in.
fn ensure_db_directory(url: &str) -> Result<(), ServerError> {
    let path = url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            info!("🗃️ Creating database directory {}", dir.display());
            std::fs::create_dir_all(dir)?;
            Ok(())
        },
        _ => Ok(()),
    }
}
