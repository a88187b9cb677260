use crate::config::Config;
use chrono::prelude::*;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::r2d2;
use once_cell::sync::OnceCell;

pub mod forwarding;
pub mod kv;
pub mod seen_items;
pub mod subscriptions;

pub type Pool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;
pub type PooledConnection = r2d2::PooledConnection<r2d2::ConnectionManager<PgConnection>>;

static POOL: OnceCell<Pool> = OnceCell::new();

pub fn current_time() -> DateTime<Utc> {
    Utc::now().round_subsecs(0)
}

pub fn pool() -> &'static Pool {
    POOL.get_or_init(create_connection_pool)
}

fn create_connection_pool() -> Pool {
    let manager = r2d2::ConnectionManager::<PgConnection>::new(Config::database_url());

    r2d2::Pool::builder()
        .max_size(Config::database_pool_size())
        .build(manager)
        .unwrap()
}
