use sqlx::{Pool, Sqlite};

use crate::auth::hash_password;
use crate::db::rooms::NewRoom;
use crate::db::users::NewUser;
use crate::db::{Role, RoomRepository, UserRepository};
use crate::error::AppError;

struct DemoRoom {
    name: &'static str,
    description: &'static str,
    price: f64,
    capacity: i64,
    room_type: &'static str,
    image_url: &'static str,
}

const DEMO_ROOMS: [DemoRoom; 4] = [
    DemoRoom {
        name: "Suite Presidencial",
        description: "Nuestra suite más lujosa con vista panorámica de la ciudad",
        price: 500.0,
        capacity: 4,
        room_type: "Suite",
        image_url: "https://picsum.photos/seed/suite1/800/600",
    },
    DemoRoom {
        name: "Habitación Deluxe",
        description: "Habitación espaciosa con todas las comodidades",
        price: 250.0,
        capacity: 2,
        room_type: "Deluxe",
        image_url: "https://picsum.photos/seed/deluxe1/800/600",
    },
    DemoRoom {
        name: "Habitación Estándar",
        description: "Habitación confortable y acogedora",
        price: 150.0,
        capacity: 2,
        room_type: "Estándar",
        image_url: "https://picsum.photos/seed/standard1/800/600",
    },
    DemoRoom {
        name: "Suite Familiar",
        description: "Perfecta para familias, con dos habitaciones conectadas",
        price: 350.0,
        capacity: 6,
        room_type: "Suite",
        image_url: "https://picsum.photos/seed/family1/800/600",
    },
];

/// Seeds a demo admin, a demo guest and the sample rooms. Does nothing once any user exists.
pub async fn seed_demo_data(pool: &Pool<Sqlite>) -> Result<bool, AppError> {
    if UserRepository::count(pool).await? > 0 {
        return Ok(false);
    }

    let accounts = [
        ("Administrador", "admin@hotel.com", "admin123", Role::Admin, "1234567890"),
        ("Usuario Demo", "user@hotel.com", "user123", Role::User, "0987654321"),
    ];
    for (name, email, password, role, phone) in accounts {
        let password_hash = hash_password(password)?;
        UserRepository::create(
            pool,
            NewUser { name, email, password_hash: &password_hash, role, phone: Some(phone) },
        )
        .await?;
    }

    for room in DEMO_ROOMS {
        RoomRepository::create(
            pool,
            NewRoom {
                name: room.name.to_string(),
                description: Some(room.description.to_string()),
                price: room.price,
                capacity: room.capacity,
                room_type: room.room_type.to_string(),
                image_url: Some(room.image_url.to_string()),
                is_available: true,
            },
        )
        .await?;
    }

    tracing::info!("Seeded demo users and {} rooms", DEMO_ROOMS.len());
    Ok(true)
}
