use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    clients::upload::UploadedFileInfo,
    dto::{
        auth::{CurrentSession, SessionResponse, SignInRequest, SignUpRequest, SignUpResponse},
        cart::{AddToCartRequest, CartItemDto, CartList, UpdateCartItemRequest},
        messages::{AiExchange, MessageList, SendAiMessageRequest, SendMessageRequest},
        orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems, TransitionRequest},
        products::{
            CategoryList, CreateProductRequest, ProductList, UpdateProductRequest,
            UpdateProductStatusRequest,
        },
        profile::UpdateProfileRequest,
        seller::DashboardStats,
        uploads::{PruneRequest, PruneResult, UploadFilesResponse, UploadRecordList},
    },
    lifecycle::{OrderAction, StatusPrompt, Timeline, TimelineStep},
    models::{
        CartItem, Category, ChatMessage, FileContentType, Order, OrderItem, OrderStatus,
        PaymentMethod, Product, ProductStatus, Profile, ProfileSummary, UploadRecord, User,
        UserType,
    },
    response::{ApiResponse, Meta},
    routes::{auth, cart, health, messages, orders, params, products, profile, seller, uploads},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::sign_up,
        auth::sign_in,
        auth::sign_out,
        auth::session,
        profile::get_profile,
        profile::update_profile,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::list_categories,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        orders::list_order,
        orders::checkout,
        orders::get_order,
        orders::advance_order,
        orders::confirm_receipt,
        orders::cancel_order,
        seller::dashboard,
        seller::list_seller_orders,
        seller::list_seller_products,
        seller::set_product_status,
        uploads::upload_files,
        uploads::list_records,
        uploads::prune,
        messages::list_messages,
        messages::send_message,
        messages::send_ai_message
    ),
    components(
        schemas(
            User,
            Profile,
            ProfileSummary,
            UserType,
            Category,
            Product,
            ProductStatus,
            CartItem,
            Order,
            OrderItem,
            OrderStatus,
            OrderAction,
            PaymentMethod,
            StatusPrompt,
            Timeline,
            TimelineStep,
            UploadRecord,
            UploadedFileInfo,
            FileContentType,
            ChatMessage,
            SignUpRequest,
            SignInRequest,
            SignUpResponse,
            SessionResponse,
            CurrentSession,
            UpdateProfileRequest,
            CreateProductRequest,
            UpdateProductRequest,
            UpdateProductStatusRequest,
            ProductList,
            CategoryList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemDto,
            CartList,
            CheckoutRequest,
            CheckoutResponse,
            TransitionRequest,
            OrderWithItems,
            OrderList,
            DashboardStats,
            UploadFilesResponse,
            UploadRecordList,
            PruneRequest,
            PruneResult,
            SendMessageRequest,
            SendAiMessageRequest,
            MessageList,
            AiExchange,
            params::Pagination,
            params::PriceRange,
            params::ProductSort,
            params::OrderScope,
            params::SortOrder,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CheckoutResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Sign-up, sign-in and sessions"),
        (name = "Profile", description = "Profile of the signed-in user"),
        (name = "Products", description = "Catalog and categories"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Orders", description = "Checkout and the order lifecycle"),
        (name = "Seller", description = "Seller dashboard and shop management"),
        (name = "Uploads", description = "File uploads and their records"),
        (name = "Messages", description = "Chat between users and with the assistant"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
