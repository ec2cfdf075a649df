// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::auth::get_profile,
        handlers::auth::update_profile,
        handlers::auth::change_password,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::get_user_by_phone,
        handlers::users::update_user,

        // --- Catalog ---
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::update_category,
        handlers::categories::archive_category,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::list_managed_products,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::archive_product,

        // --- Public ---
        handlers::public::list_categories,
        handlers::public::get_category,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::my_customers,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Order status ---
        handlers::order_status::list_statuses,
        handlers::order_status::get_status,
        handlers::order_status::create_status,
        handlers::order_status::update_status,
        handlers::order_status::delete_status,

        // --- Orders / Payments ---
        handlers::orders::list_orders,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::list_payments,
        handlers::orders::add_payment,

        // --- Appointments ---
        handlers::appointments::list_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::get_appointment,
        handlers::appointments::update_appointment,

        // --- Settings ---
        handlers::settings::list_settings,
        handlers::settings::get_setting,
        handlers::settings::upsert_setting,
        handlers::settings::set_setting,

        // --- Uploads ---
        handlers::uploads::upload_product_image,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::RegisterUserPayload,
            models::auth::ForgotPasswordPayload,
            models::auth::ResetPasswordPayload,
            models::auth::ChangePasswordPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AuthResponse,
            models::auth::OkResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- Catalog ---
            models::catalog::ProductType,
            models::catalog::Category,
            models::catalog::CreateCategoryPayload,
            models::catalog::UpdateCategoryPayload,
            models::catalog::CategoryWithProducts,
            models::catalog::Product,
            models::catalog::CreateProductPayload,
            models::catalog::UpdateProductPayload,

            // --- Customers ---
            models::customer::Customer,
            models::customer::CreateCustomerPayload,
            models::customer::UpdateCustomerPayload,

            // --- Orders ---
            models::order::OrderSource,
            models::order::PaymentMethod,
            models::order::OrderStatus,
            models::order::CreateOrderStatusPayload,
            models::order::UpdateOrderStatusPayload,
            models::order::Order,
            models::order::OrderItem,
            models::order::Payment,
            models::order::OrderDetail,
            models::order::OrderLinePayload,
            models::order::CreateOrderPayload,
            models::order::UpdateOrderPayload,
            models::order::CreatePaymentPayload,

            // --- Appointments ---
            models::appointment::AppointmentStatus,
            models::appointment::Appointment,
            models::appointment::CreateAppointmentPayload,
            models::appointment::UpdateAppointmentPayload,

            // --- Settings / Uploads ---
            models::settings::Setting,
            models::settings::UpsertSettingPayload,
            models::settings::SetSettingValuePayload,
            models::uploads::ProductImageForm,
            models::uploads::UploadResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login, registro e recuperação de senha"),
        (name = "Users", description = "Administração de usuários da loja"),
        (name = "Catalog", description = "Categorias e produtos"),
        (name = "Public", description = "Vitrine sem autenticação"),
        (name = "Customers", description = "Clientes"),
        (name = "OrderStatus", description = "Status de pedido definidos pela loja"),
        (name = "Orders", description = "Pedidos com preço congelado"),
        (name = "Payments", description = "Pagamentos de pedidos"),
        (name = "Appointments", description = "Agendamentos"),
        (name = "Settings", description = "Configurações chave/valor da loja"),
        (name = "Uploads", description = "Imagens de produto")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
