//! Request handler definitions
//!
//! Define each route and its handler here. Handlers are thin: they pull the account id out of the verified access
//! token, call into the engine APIs and wrap the result in a [`JsonResponse`] envelope. Any logic beyond that belongs
//! in `bazaar_engine`.
//!
//! Since each worker thread processes its requests sequentially, handlers must never block the current thread. All
//! database access is async, and password hashing is pushed onto the blocking thread pool with [`web::block`].
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use bazaar_engine::{
    db_types::{CustomerId, MerchantId, NewCustomer, NewMerchant, ProductId, ProductUpdate, Role},
    traits::{AccountManagement, CartManagement, CatalogManagement, OrderManagement},
    AccountApi,
    AuthApi,
    CartApi,
    CatalogApi,
    OrderFlowApi,
};
use log::*;

use crate::{
    auth::{hash_password, verify_password, JwtClaims, TokenIssuer},
    data_objects::{
        AccountSummary,
        AddToCartRequest,
        AdjustQtyRequest,
        BrowseParams,
        CustomerSignup,
        JsonResponse,
        LoginRequest,
        LoginResponse,
        MerchantSignup,
        NameSearch,
        NewProductRequest,
        UpdateProductRequest,
    },
    errors::{AuthError, ServerError},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+ where requires [$($roles:expr),+])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().json(JsonResponse::success("👍️"))
}

/// The fallback for every unregistered route.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    debug!("💻️ No route for {} {}", req.method(), req.path());
    HttpResponse::NotFound().json(JsonResponse::failure("Route not found"))
}

//----------------------------------------------   Login  ----------------------------------------------------
route!(admin_login => Post "/admin/login" impl AccountManagement);
pub async fn admin_login<A: AccountManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<A>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    login(Role::Admin, body.into_inner(), api.as_ref(), signer.as_ref()).await
}

route!(customer_login => Post "/customer/login" impl AccountManagement);
pub async fn customer_login<A: AccountManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<A>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    login(Role::Customer, body.into_inner(), api.as_ref(), signer.as_ref()).await
}

route!(merchant_login => Post "/merchant/login" impl AccountManagement);
pub async fn merchant_login<A: AccountManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<A>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    login(Role::Merchant, body.into_inner(), api.as_ref(), signer.as_ref()).await
}

/// Unknown emails and wrong passwords produce the same error, so logins cannot be used to discover accounts.
async fn login<A: AccountManagement>(
    role: Role,
    request: LoginRequest,
    api: &AuthApi<A>,
    signer: &TokenIssuer,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST {role} login");
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ServerError::ValidationError("Email and password are required".into()));
    }
    let creds = api.credentials(role, &request.email).await?.ok_or_else(|| {
        debug!("💻️ No {role} account for {}", request.email);
        AuthError::InvalidCredentials
    })?;
    let hash = creds.password_hash.clone();
    let password = request.password;
    let valid = web::block(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ServerError::Unspecified(e.to_string()))??;
    if !valid {
        debug!("💻️ Wrong password for {role} #{}", creds.id);
        return Err(AuthError::InvalidCredentials.into());
    }
    let token = signer.issue_token(creds.id, role)?;
    info!("💻️ {role} #{} logged in", creds.id);
    let data = LoginResponse { token, user_id: creds.id, name: creds.name };
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Login successful", data)))
}

async fn hash_blocking(password: String) -> Result<String, ServerError> {
    if password.is_empty() {
        return Err(ServerError::ValidationError("password is required".into()));
    }
    web::block(move || hash_password(&password)).await.map_err(|e| ServerError::Unspecified(e.to_string()))?
}

//----------------------------------------------   Signup  ----------------------------------------------------
route!(customer_signup => Post "/customer/signup" impl AccountManagement);
pub async fn customer_signup<A: AccountManagement>(
    body: web::Json<CustomerSignup>,
    api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST customer signup");
    let CustomerSignup { name, email, password, phone, address } = body.into_inner();
    let password_hash = hash_blocking(password).await?;
    let customer = api.register_customer(NewCustomer { name, email, password_hash, phone, address }).await?;
    let data = AccountSummary { id: customer.id.value(), name: customer.name, email: customer.email };
    Ok(HttpResponse::Created().json(JsonResponse::with_data("Customer created successfully", data)))
}

route!(merchant_signup => Post "/merchant/signup" impl AccountManagement);
pub async fn merchant_signup<A: AccountManagement>(
    body: web::Json<MerchantSignup>,
    api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST merchant signup");
    let MerchantSignup { owner_name, email, password } = body.into_inner();
    let password_hash = hash_blocking(password).await?;
    let merchant = api.register_merchant(NewMerchant { owner_name, email, password_hash }).await?;
    let data = AccountSummary { id: merchant.id.value(), name: merchant.owner_name, email: merchant.email };
    Ok(HttpResponse::Created().json(JsonResponse::with_data("Merchant created successfully", data)))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(customers => Get "/admin/customers" impl AccountManagement where requires [Role::Admin]);
/// Lists the customers whose name contains every word of the `name` query parameter. An empty `name` lists everyone.
pub async fn customers<A: AccountManagement>(
    claims: JwtClaims,
    query: web::Query<NameSearch>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET customers matching '{}' for admin #{}", query.name, claims.admin_id()?.value());
    let customers = api.search_customers(&query.name).await?;
    if customers.is_empty() {
        return Err(ServerError::NoRecordFound("No customers found".into()));
    }
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Customers found", customers)))
}

route!(merchants => Get "/admin/merchants" impl AccountManagement where requires [Role::Admin]);
pub async fn merchants<A: AccountManagement>(
    claims: JwtClaims,
    query: web::Query<NameSearch>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET merchants matching '{}' for admin #{}", query.name, claims.admin_id()?.value());
    let merchants = api.search_merchants(&query.name).await?;
    if merchants.is_empty() {
        return Err(ServerError::NoRecordFound("No merchants found".into()));
    }
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Merchants found", merchants)))
}

route!(delete_customer => Delete "/admin/customer/{id}" impl AccountManagement where requires [Role::Admin]);
pub async fn delete_customer<A: AccountManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = CustomerId(path.into_inner());
    info!("💻️ Admin #{} is deleting {customer_id}", claims.admin_id()?.value());
    api.delete_customer(customer_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Customer deleted successfully")))
}

route!(delete_merchant => Delete "/admin/merchant/{id}" impl AccountManagement where requires [Role::Admin]);
pub async fn delete_merchant<A: AccountManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let merchant_id = MerchantId(path.into_inner());
    info!("💻️ Admin #{} is deleting {merchant_id}", claims.admin_id()?.value());
    api.delete_merchant(merchant_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Merchant deleted successfully")))
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(browse_products => Get "/customer/products" impl CatalogManagement where requires [Role::Customer]);
/// Browse the catalog. Supports `category`, `minPrice`, `maxPrice` and `sort` (e.g. `price` or `-price`) query
/// parameters.
pub async fn browse_products<A: CatalogManagement>(
    query: web::Query<BrowseParams>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner().into_query()?;
    debug!("💻️ GET products with {query:?}");
    let products = api.browse(&query).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Products fetched successfully", products)))
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(view_cart => Get "/customer/cart" impl CartManagement, CatalogManagement where requires [Role::Customer]);
pub async fn view_cart<A: CartManagement + CatalogManagement>(
    claims: JwtClaims,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = claims.customer_id()?;
    debug!("💻️ GET cart for {customer_id}");
    let cart = api.view_cart(customer_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Cart fetched successfully", cart)))
}

route!(add_to_cart => Post "/customer/cart" impl CartManagement, CatalogManagement where requires [Role::Customer]);
pub async fn add_to_cart<A: CartManagement + CatalogManagement>(
    claims: JwtClaims,
    body: web::Json<AddToCartRequest>,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = claims.customer_id()?;
    let AddToCartRequest { product_id, qty } = body.into_inner();
    debug!("💻️ POST {qty} x {product_id} to the cart of {customer_id}");
    let cart = api.add_item(customer_id, product_id, qty).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Item added to cart", cart)))
}

route!(adjust_cart_item => Patch "/customer/cart/{product_id}" impl CartManagement, CatalogManagement where requires [Role::Customer]);
/// Step a cart line up or down by one. The body is `{"action": "inc"}` or `{"action": "dec"}`.
pub async fn adjust_cart_item<A: CartManagement + CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<AdjustQtyRequest>,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = claims.customer_id()?;
    let product_id = ProductId(path.into_inner());
    debug!("💻️ PATCH {product_id} ({:?}) in the cart of {customer_id}", body.action);
    let cart = api.adjust_qty(customer_id, product_id, body.action).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Cart updated", cart)))
}

route!(remove_cart_item => Delete "/customer/cart/{product_id}" impl CartManagement, CatalogManagement where requires [Role::Customer]);
pub async fn remove_cart_item<A: CartManagement + CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = claims.customer_id()?;
    let product_id = ProductId(path.into_inner());
    debug!("💻️ DELETE {product_id} from the cart of {customer_id}");
    let cart = api.remove_item(customer_id, product_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Item removed from cart", cart)))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/customer/order" impl CartManagement, OrderManagement where requires [Role::Customer]);
pub async fn place_order<A: CartManagement + OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = claims.customer_id()?;
    debug!("💻️ POST order for {customer_id}");
    let order = api.place_order(customer_id).await?;
    Ok(HttpResponse::Created().json(JsonResponse::with_data("Order placed successfully", order)))
}

route!(view_order => Get "/customer/order" impl CartManagement, OrderManagement where requires [Role::Customer]);
/// Fetches the customer's most recent order.
pub async fn view_order<A: CartManagement + OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = claims.customer_id()?;
    debug!("💻️ GET latest order for {customer_id}");
    let order = api.view_order(customer_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Order fetched successfully", order)))
}

route!(order_history => Get "/customer/orders" impl CartManagement, OrderManagement where requires [Role::Customer]);
pub async fn order_history<A: CartManagement + OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = claims.customer_id()?;
    debug!("💻️ GET order history for {customer_id}");
    let orders = api.order_history(customer_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Orders fetched successfully", orders)))
}

route!(merchant_orders => Get "/merchant/orders" impl CartManagement, OrderManagement where requires [Role::Merchant]);
/// Orders that contain at least one of the merchant's products.
pub async fn merchant_orders<A: CartManagement + OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let merchant_id = claims.merchant_id()?;
    debug!("💻️ GET orders for {merchant_id}");
    let orders = api.orders_for_merchant(merchant_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Orders fetched successfully", orders)))
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(my_products => Get "/merchant/products" impl CatalogManagement where requires [Role::Merchant]);
pub async fn my_products<A: CatalogManagement>(
    claims: JwtClaims,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let merchant_id = claims.merchant_id()?;
    debug!("💻️ GET products for {merchant_id}");
    let products = api.products_for_merchant(merchant_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Products fetched successfully", products)))
}

route!(add_product => Post "/merchant/products" impl CatalogManagement where requires [Role::Merchant]);
pub async fn add_product<A: CatalogManagement>(
    claims: JwtClaims,
    body: web::Json<NewProductRequest>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let merchant_id = claims.merchant_id()?;
    let product = body.into_inner().into_new_product(merchant_id)?;
    debug!("💻️ POST new product '{}' for {merchant_id}", product.name);
    let product = api.add_product(product).await?;
    Ok(HttpResponse::Created().json(JsonResponse::with_data("Product added successfully", product)))
}

route!(edit_product => Put "/merchant/products/{id}" impl CatalogManagement where requires [Role::Merchant]);
pub async fn edit_product<A: CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<UpdateProductRequest>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let merchant_id = claims.merchant_id()?;
    let product_id = ProductId(path.into_inner());
    let update = ProductUpdate::try_from(body.into_inner())?;
    debug!("💻️ PUT {product_id} for {merchant_id}");
    let product = api.edit_product(merchant_id, product_id, update).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Product updated successfully", product)))
}

route!(delete_product => Delete "/merchant/products/{id}" impl CatalogManagement where requires [Role::Merchant]);
pub async fn delete_product<A: CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let merchant_id = claims.merchant_id()?;
    let product_id = ProductId(path.into_inner());
    debug!("💻️ DELETE {product_id} for {merchant_id}");
    api.delete_product(merchant_id, product_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Product deleted successfully")))
}
