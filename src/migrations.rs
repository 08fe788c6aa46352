use deadpool_postgres::Pool;
use log::info;
use tokio_postgres::Transaction;

pub struct MigrationManager;

impl MigrationManager {
    pub async fn run_migrations(
        pool: &Pool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Running database migrations...");
        let mut client = pool.get().await?;

        let needs_init = client
            .query_opt(
                "SELECT 1 FROM pg_tables WHERE schemaname = 'public' AND tablename = 'schema_migrations'",
                &[],
            )
            .await?
            .is_none();

        if needs_init {
            let transaction = client.transaction().await?;
            Self::initial_setup(&transaction).await?;
            transaction.commit().await?;
            info!("Initial database setup completed");
        }

        let current_version = Self::get_current_version(&client).await?;
        if current_version < Self::latest_version() {
            let transaction = client.transaction().await?;
            Self::run_pending_migrations(&transaction, current_version).await?;
            transaction.commit().await?;
            info!("Database migrations completed");
        } else {
            info!("Database schema is up to date");
        }

        Ok(())
    }

    /// creates the tracking table and the users table.
    ///
    /// `IF NOT EXISTS` lets a database created by an earlier deployment be adopted as is.
    async fn initial_setup(
        transaction: &Transaction<'_>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let migration_sql = r#"
            CREATE TABLE schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS users (
                user_id BIGINT PRIMARY KEY,
                language TEXT,
                balance INTEGER DEFAULT 0,
                referred_by BIGINT,
                subscribed BOOLEAN DEFAULT FALSE
            );

            INSERT INTO schema_migrations (version) VALUES (1);
        "#;

        transaction.batch_execute(migration_sql).await?;
        Ok(())
    }

    async fn get_current_version(
        client: &deadpool_postgres::Object,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let row = client
            .query_one("SELECT MAX(version) FROM schema_migrations", &[])
            .await?;
        Ok(row.get::<_, Option<i32>>(0).unwrap_or(0))
    }

    fn latest_version() -> i32 {
        2 // increment this when adding new migrations
    }

    async fn run_pending_migrations(
        transaction: &Transaction<'_>,
        current_version: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for version in (current_version + 1)..=Self::latest_version() {
            match version {
                2 => {
                    // persisted onboarding state, timestamps, and referral lookups
                    let migration_sql = r#"
                        UPDATE users SET balance = 0 WHERE balance IS NULL;
                        UPDATE users SET subscribed = FALSE WHERE subscribed IS NULL;

                        ALTER TABLE users
                        ALTER COLUMN balance SET NOT NULL,
                        ALTER COLUMN subscribed SET NOT NULL,
                        ADD CONSTRAINT users_balance_non_negative CHECK (balance >= 0),
                        ADD COLUMN state VARCHAR(32) NOT NULL DEFAULT 'new' CHECK (state IN ('new', 'choosing_language', 'checking_subscription', 'active')),
                        ADD COLUMN created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
                        ADD COLUMN updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW();

                        -- rows from before the state column existed
                        UPDATE users SET state = CASE
                            WHEN subscribed THEN 'active'
                            WHEN language IS NOT NULL THEN 'checking_subscription'
                            ELSE 'choosing_language'
                        END;

                        CREATE INDEX idx_users_referred_by ON users(referred_by);
                        CREATE INDEX idx_users_balance ON users(balance DESC);
                    "#;
                    transaction.batch_execute(migration_sql).await?;
                }
                _ => {}
            }
            transaction
                .execute(
                    "INSERT INTO schema_migrations (version) VALUES ($1)",
                    &[&version],
                )
                .await?;
        }
        Ok(())
    }
}
