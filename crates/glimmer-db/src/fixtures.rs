//! Catalog and host records every fresh store starts with.

use chrono::{DateTime, Utc};
use glimmer_types::models::{Gift, Host};

struct SeedGift {
    name: &'static str,
    emoji: &'static str,
    coin_cost: i64,
    animation: &'static str,
}

struct SeedHost {
    name: &'static str,
    bio: &'static str,
    rating: &'static str,
    coin_rate: i64,
    is_online: bool,
    is_verified: bool,
    total_earnings: i64,
    avatar: &'static str,
}

const GIFTS: [SeedGift; 8] = [
    SeedGift { name: "Coffee", emoji: "☕", coin_cost: 15, animation: "float" },
    SeedGift { name: "Pizza slice", emoji: "🍕", coin_cost: 25, animation: "bounce" },
    SeedGift { name: "Sunflower", emoji: "🌻", coin_cost: 35, animation: "pulse" },
    SeedGift { name: "Book", emoji: "📚", coin_cost: 40, animation: "wiggle" },
    SeedGift { name: "Concert ticket", emoji: "🎵", coin_cost: 85, animation: "drive" },
    SeedGift { name: "Nice dinner", emoji: "🍽️", coin_cost: 120, animation: "sparkle" },
    SeedGift { name: "Weekend trip", emoji: "✈️", coin_cost: 300, animation: "explode" },
    SeedGift { name: "Surprise gift", emoji: "🎁", coin_cost: 200, animation: "shine" },
];

const AVATAR_PARAMS: &str = "?ixlib=rb-4.0.3&w=400&h=500&fit=crop&crop=face";

const HOSTS: [SeedHost; 9] = [
    SeedHost {
        name: "Emma",
        bio: "Psychology student who loves deep talks about life",
        rating: "4.8",
        coin_rate: 35,
        is_online: true,
        is_verified: true,
        total_earnings: 12500,
        avatar: "photo-1494790108755-2616b612b830",
    },
    SeedHost {
        name: "Sofia",
        bio: "Coffee addict & bookworm from Barcelona",
        rating: "4.6",
        coin_rate: 28,
        is_online: true,
        is_verified: false,
        total_earnings: 8900,
        avatar: "photo-1524504388940-b1c1722653e1",
    },
    SeedHost {
        name: "Maya",
        bio: "Digital artist working from Bali",
        rating: "4.9",
        coin_rate: 42,
        is_online: true,
        is_verified: true,
        total_earnings: 15600,
        avatar: "photo-1517841905240-472988babdf9",
    },
    SeedHost {
        name: "Chloe",
        bio: "Just moved to NYC, exploring the city",
        rating: "4.5",
        coin_rate: 32,
        is_online: true,
        is_verified: false,
        total_earnings: 6700,
        avatar: "photo-1529626455594-4ff0802cfb7e",
    },
    SeedHost {
        name: "Lily",
        bio: "Med student taking a break from studying",
        rating: "4.7",
        coin_rate: 25,
        is_online: true,
        is_verified: false,
        total_earnings: 3200,
        avatar: "photo-1544725176-7c40e5a71c5e",
    },
    SeedHost {
        name: "Nina",
        bio: "Marketing manager working remote from Mexico",
        rating: "4.8",
        coin_rate: 38,
        is_online: true,
        is_verified: true,
        total_earnings: 9800,
        avatar: "photo-1534528741775-53994a69daeb",
    },
    SeedHost {
        name: "Alex",
        bio: "Freelance photographer documenting city life",
        rating: "4.6",
        coin_rate: 30,
        is_online: true,
        is_verified: false,
        total_earnings: 5400,
        avatar: "photo-1507003211169-0a1dd7228f2d",
    },
    SeedHost {
        name: "Zara",
        bio: "Fashion design student from London",
        rating: "4.9",
        coin_rate: 45,
        is_online: false,
        is_verified: true,
        total_earnings: 14200,
        avatar: "photo-1493666438817-866a91353ca9",
    },
    SeedHost {
        name: "Kate",
        bio: "Weekend chef who loves trying new recipes",
        rating: "4.4",
        coin_rate: 22,
        is_online: false,
        is_verified: false,
        total_earnings: 2100,
        avatar: "photo-1502323777036-f29e3972d82f",
    },
];

/// Gift catalog with ids assigned from 1 in catalog order.
pub fn gifts() -> Vec<Gift> {
    GIFTS
        .iter()
        .zip(1..)
        .map(|(g, id)| Gift {
            id,
            name: g.name.to_string(),
            emoji: g.emoji.to_string(),
            coin_cost: g.coin_cost,
            animation: Some(g.animation.to_string()),
        })
        .collect()
}

/// Starter hosts with ids assigned from 1, all stamped with `now`.
pub fn hosts(now: DateTime<Utc>) -> Vec<Host> {
    HOSTS
        .iter()
        .zip(1..)
        .map(|(h, id)| Host {
            id,
            user_id: None,
            name: h.name.to_string(),
            bio: Some(h.bio.to_string()),
            rating: h.rating.to_string(),
            coin_rate: h.coin_rate,
            is_online: h.is_online,
            is_verified: h.is_verified,
            total_earnings: h.total_earnings,
            avatar: Some(format!("https://images.unsplash.com/{}{}", h.avatar, AVATAR_PARAMS)),
            created_at: now,
        })
        .collect()
}
