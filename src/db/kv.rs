use crate::db;
use crate::schema::kv_entries;
use chrono::Duration;
use diesel::prelude::*;
use diesel::result::Error;

#[derive(Insertable)]
#[diesel(table_name = kv_entries)]
struct NewKvEntry<'a> {
    key: &'a str,
    value: &'a str,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

pub fn get(conn: &mut PgConnection, key: &str) -> Result<Option<String>, Error> {
    let record = kv_entries::table
        .filter(kv_entries::key.eq(key))
        .select((kv_entries::value, kv_entries::expires_at))
        .first::<(String, Option<chrono::DateTime<chrono::Utc>>)>(conn)
        .optional()?;

    match record {
        Some((_, Some(expires_at))) if expires_at <= db::current_time() => {
            delete(conn, key)?;

            Ok(None)
        }
        Some((value, _)) => Ok(Some(value)),
        None => Ok(None),
    }
}

pub fn put(conn: &mut PgConnection, key: &str, value: &str) -> Result<(), Error> {
    upsert(conn, key, value, None)
}

pub fn put_with_ttl(
    conn: &mut PgConnection,
    key: &str,
    value: &str,
    ttl: Duration,
) -> Result<(), Error> {
    upsert(conn, key, value, Some(db::current_time() + ttl))
}

pub fn delete(conn: &mut PgConnection, key: &str) -> Result<(), Error> {
    diesel::delete(kv_entries::table.filter(kv_entries::key.eq(key))).execute(conn)?;

    Ok(())
}

fn upsert(
    conn: &mut PgConnection,
    key: &str,
    value: &str,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<(), Error> {
    let entry = NewKvEntry {
        key,
        value,
        expires_at,
        updated_at: db::current_time(),
    };

    diesel::insert_into(kv_entries::table)
        .values(&entry)
        .on_conflict(kv_entries::key)
        .do_update()
        .set((
            kv_entries::value.eq(value),
            kv_entries::expires_at.eq(expires_at),
            kv_entries::updated_at.eq(db::current_time()),
        ))
        .execute(conn)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::db;
    use diesel::connection::Connection;
    use diesel::result::Error;

    #[test]
    #[ignore]
    fn it_round_trips_a_value() {
        let mut connection = db::pool().get().unwrap();

        connection.test_transaction::<_, Error, _>(|conn| {
            super::put(conn, "some_key", "some_value")?;

            assert_eq!(super::get(conn, "some_key")?, Some("some_value".to_string()));

            super::put(conn, "some_key", "other_value")?;

            assert_eq!(super::get(conn, "some_key")?, Some("other_value".to_string()));

            super::delete(conn, "some_key")?;

            assert_eq!(super::get(conn, "some_key")?, None);

            Ok(())
        });
    }

    #[test]
    #[ignore]
    fn it_treats_expired_entries_as_absent() {
        let mut connection = db::pool().get().unwrap();

        connection.test_transaction::<_, Error, _>(|conn| {
            super::put_with_ttl(conn, "expiring_key", "value", chrono::Duration::seconds(-1))?;

            assert_eq!(super::get(conn, "expiring_key")?, None);

            Ok(())
        });
    }
}
