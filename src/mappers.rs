use chrono::Utc;

use crate::{
    entity::{
        cart_items, categories, cloud_uploads, messages, order_items, orders, products, profiles,
        users,
    },
    models::{
        CartItem, Category, ChatMessage, Order, OrderItem, Product, Profile, ProfileSummary,
        UploadRecord, User,
    },
};

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: model.id,
            email: model.email,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<profiles::Model> for Profile {
    fn from(model: profiles::Model) -> Self {
        Profile {
            id: model.id,
            full_name: model.full_name,
            phone: model.phone,
            address: model.address,
            avatar_url: model.avatar_url,
            user_type: model.user_type,
            is_verified: model.is_verified,
            shop_description: model.shop_description,
            payment_description: model.payment_description,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<profiles::Model> for ProfileSummary {
    fn from(model: profiles::Model) -> Self {
        ProfileSummary {
            id: model.id,
            full_name: model.full_name,
            phone: model.phone,
            payment_description: model.payment_description,
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Category {
            id: model.id,
            name: model.name,
            category_type: model.category_type,
            description: model.description,
            icon: model.icon,
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Product {
            id: model.id,
            seller_id: model.seller_id,
            category_id: model.category_id,
            name: model.name,
            description: model.description,
            price: model.price,
            original_price: model.original_price,
            unit: model.unit,
            quantity: model.quantity,
            image_url: model.image_url,
            location: model.location,
            origin: model.origin,
            certification: model.certification,
            delivery_time: model.delivery_time,
            status: model.status,
            views: model.views,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        CartItem {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Order {
            id: model.id,
            buyer_id: model.buyer_id,
            seller_id: model.seller_id,
            total_amount: model.total_amount,
            shipping_address: model.shipping_address,
            shipping_phone: model.shipping_phone,
            payment_method: model.payment_method,
            status: model.status,
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        OrderItem {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            product_name: model.product_name,
            product_unit: model.product_unit,
            product_image_url: model.product_image_url,
            delivery_time: model.delivery_time,
            quantity: model.quantity,
            price: model.price,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<cloud_uploads::Model> for UploadRecord {
    fn from(model: cloud_uploads::Model) -> Self {
        UploadRecord {
            id: model.id,
            user_id: model.user_id,
            url: model.url,
            content_type: model.content_type,
            reference: model.reference,
            upload_at: model.upload_at.with_timezone(&Utc),
        }
    }
}

impl From<messages::Model> for ChatMessage {
    fn from(model: messages::Model) -> Self {
        ChatMessage {
            id: model.id,
            sender_id: model.sender_id,
            receiver_id: model.receiver_id,
            bot_sender_id: model.bot_sender_id,
            bot_receiver_id: model.bot_receiver_id,
            content: model.content,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
