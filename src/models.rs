use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub use crate::lifecycle::OrderStatus;

/// Text-backed enums stored as plain columns. Each gets `as_str`, `FromStr`
/// and snake_case serde.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(concat!("invalid ", stringify!($name), " `{}`"), other)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(UserType {
    Buyer => "buyer",
    Seller => "seller",
    Admin => "admin",
});

text_enum!(PaymentMethod {
    Cod => "cod",
    BankTransfer => "bank_transfer",
    EWallet => "e_wallet",
});

text_enum!(ProductStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    SoldOut => "sold_out",
});

text_enum!(CategoryType {
    Vegetables => "vegetables",
    Fruits => "fruits",
    Herbs => "herbs",
    Grains => "grains",
    Seafood => "seafood",
    Specialties => "specialties",
});

text_enum!(
    /// Tag attached to an upload record.
    FileContentType {
        Uncategorized => "uncategorized",
        ProductImage => "product_image",
        PaymentQr => "payment_qr",
    }
);

text_enum!(BotIdentifier {
    OpenaiVirtualAssistant => "openai_virtual_assistant",
});

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cod => "Thanh toán khi nhận hàng (COD)",
            PaymentMethod::BankTransfer => "Chuyển khoản ngân hàng",
            PaymentMethod::EWallet => "Ví điện tử",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub user_type: String,
    pub is_verified: bool,
    pub shop_description: Option<String>,
    pub payment_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The parts of a profile shown to the other party of an order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub payment_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub category_type: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub unit: Option<String>,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub origin: Option<String>,
    pub certification: Option<String>,
    pub delivery_time: Option<String>,
    pub status: String,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub total_amount: i64,
    pub shipping_address: Option<String>,
    pub shipping_phone: Option<String>,
    pub payment_method: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub product_unit: Option<String>,
    pub product_image_url: Option<String>,
    pub delivery_time: Option<String>,
    pub quantity: i32,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadRecord {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub url: String,
    pub content_type: String,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub upload_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender_id: Option<Uuid>,
    pub receiver_id: Option<Uuid>,
    pub bot_sender_id: Option<String>,
    pub bot_receiver_id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
