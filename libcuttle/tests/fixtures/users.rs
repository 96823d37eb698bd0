// Code generated by cuttle. DO NOT EDIT.
// Unit: users

pub trait Users {
    /// Inserts a new user.
    ///
    /// Fails if the id is taken.
    fn create(&self, tx: &mut dyn cuttle::runtime::WTx, id: i64, name: &str) -> cuttle::runtime::Result<i64>;

    /// Inserts a new user.
    ///
    /// Fails if the id is taken.
    fn create_async(&self, tx: &mut dyn cuttle::runtime::AsyncWTx, id: i64, name: &str, callback: cuttle::runtime::AsyncHandler<i64>);

    fn get(&self, tx: &mut dyn cuttle::runtime::RTx, id: i64) -> cuttle::runtime::Result<UsersGetRow>;

    fn get_async(&self, tx: &mut dyn cuttle::runtime::AsyncRTx, id: i64, callback: cuttle::runtime::AsyncHandler<UsersGetRow>);

    fn list(&self, tx: &mut dyn cuttle::runtime::RTx) -> cuttle::runtime::Result<Vec<UsersListRow>>;

    fn list_async(&self, tx: &mut dyn cuttle::runtime::AsyncRTx, callback: cuttle::runtime::AsyncHandler<Vec<UsersListRow>>);
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsersGetRow {
    pub id:    i64,
    pub name:  String,
    pub email: Option<String>,
}

impl cuttle::runtime::FromRow for UsersGetRow {
    fn from_row(row: &cuttle::runtime::Row) -> cuttle::runtime::Result<Self> {
        Ok(UsersGetRow {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsersListRow {
    pub id:   i64,
    pub name: String,
}

impl cuttle::runtime::FromRow for UsersListRow {
    fn from_row(row: &cuttle::runtime::Row) -> cuttle::runtime::Result<Self> {
        Ok(UsersListRow {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

static USERS_DIALECTS: [cuttle::dialect::Dialect; 2] = [
    cuttle::dialect::POSTGRES,
    cuttle::dialect::SQLITE,
];

#[derive(Debug, Clone, Copy)]
pub struct UsersImpl {
    dialect:       &'static cuttle::dialect::Dialect,
    dialect_index: usize,
}

impl UsersImpl {
    /// Binds the repository to the declared dialect that best serves `dialect`.
    pub fn new(dialect: &cuttle::dialect::Dialect) -> cuttle::runtime::Result<Self> {
        let dialect_index = dialect.select(&USERS_DIALECTS)?;

        Ok(UsersImpl {
            dialect: &USERS_DIALECTS[dialect_index],
            dialect_index,
        })
    }

    /// The declared dialect this instance is bound to.
    pub fn dialect(&self) -> &'static cuttle::dialect::Dialect {
        self.dialect
    }

    fn create_stmt(&self) -> &'static str {
        match self.dialect_index {
            0 => r#"/* Users:Create */ INSERT INTO users (id, name) VALUES ($1, $2)"#,
            1 => r#"/* Users:Create */ INSERT INTO users (id, name) VALUES (?, ?)"#,
            _ => unreachable!("dialect index is checked by UsersImpl::new"),
        }
    }

    fn get_stmt(&self) -> &'static str {
        match self.dialect_index {
            0 => r#"/* Users:Get */ SELECT id, name, email FROM users WHERE id = $1"#,
            1 => r#"/* Users:Get */ SELECT id, name, email FROM users WHERE id = ?"#,
            _ => unreachable!("dialect index is checked by UsersImpl::new"),
        }
    }

    fn list_stmt(&self) -> &'static str {
        match self.dialect_index {
            0 => r#"/* Users:List */ SELECT id, name
  FROM users
 ORDER BY id DESC"#,
            1 => r#"/* Users:List */ SELECT id, name
  FROM users
 ORDER BY id DESC"#,
            _ => unreachable!("dialect index is checked by UsersImpl::new"),
        }
    }
}

impl Users for UsersImpl {
    fn create(&self, tx: &mut dyn cuttle::runtime::WTx, id: i64, name: &str) -> cuttle::runtime::Result<i64> {
        tx.exec(self.create_stmt(), &[
            cuttle::runtime::ToValue::to_value(&id),
            cuttle::runtime::ToValue::to_value(&name),
        ]).map(|exec| exec.rows_affected())
    }

    fn create_async(&self, tx: &mut dyn cuttle::runtime::AsyncWTx, id: i64, name: &str, callback: cuttle::runtime::AsyncHandler<i64>) {
        tx.exec(
            Box::new(move |result: cuttle::runtime::Result<cuttle::runtime::Exec>| {
                callback(result.map(|exec| exec.rows_affected()))
            }),
            self.create_stmt(),
            vec![
                cuttle::runtime::ToValue::to_value(&id),
                cuttle::runtime::ToValue::to_value(&name),
            ],
        );
    }

    fn get(&self, tx: &mut dyn cuttle::runtime::RTx, id: i64) -> cuttle::runtime::Result<UsersGetRow> {
        tx.query_row(self.get_stmt(), &[
            cuttle::runtime::ToValue::to_value(&id),
        ]).and_then(|row| <UsersGetRow as cuttle::runtime::FromRow>::from_row(&row))
    }

    fn get_async(&self, tx: &mut dyn cuttle::runtime::AsyncRTx, id: i64, callback: cuttle::runtime::AsyncHandler<UsersGetRow>) {
        tx.query_row(
            Box::new(move |result: cuttle::runtime::Result<cuttle::runtime::Row>| {
                callback(result.and_then(|row| <UsersGetRow as cuttle::runtime::FromRow>::from_row(&row)))
            }),
            self.get_stmt(),
            vec![
                cuttle::runtime::ToValue::to_value(&id),
            ],
        );
    }

    fn list(&self, tx: &mut dyn cuttle::runtime::RTx) -> cuttle::runtime::Result<Vec<UsersListRow>> {
        cuttle::runtime::decode_rows(tx.query(self.list_stmt(), &[])?)
    }

    fn list_async(&self, tx: &mut dyn cuttle::runtime::AsyncRTx, callback: cuttle::runtime::AsyncHandler<Vec<UsersListRow>>) {
        tx.query(
            Box::new(move |result: cuttle::runtime::Result<cuttle::runtime::Rows>| {
                callback(result.and_then(cuttle::runtime::decode_rows))
            }),
            self.list_stmt(),
            vec![],
        );
    }
}

pub trait Stats {
    fn count_users(&self, tx: &mut dyn cuttle::runtime::RTx) -> cuttle::runtime::Result<StatsCountUsersRow>;

    fn count_users_async(&self, tx: &mut dyn cuttle::runtime::AsyncRTx, callback: cuttle::runtime::AsyncHandler<StatsCountUsersRow>);
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsCountUsersRow {
    pub total: i64,
}

impl cuttle::runtime::FromRow for StatsCountUsersRow {
    fn from_row(row: &cuttle::runtime::Row) -> cuttle::runtime::Result<Self> {
        Ok(StatsCountUsersRow {
            total: row.get(0)?,
        })
    }
}

static STATS_DIALECTS: [cuttle::dialect::Dialect; 1] = [
    cuttle::dialect::GENERIC,
];

#[derive(Debug, Clone, Copy)]
pub struct StatsImpl {
    dialect:       &'static cuttle::dialect::Dialect,
    dialect_index: usize,
}

impl StatsImpl {
    /// Binds the repository to the declared dialect that best serves `dialect`.
    pub fn new(dialect: &cuttle::dialect::Dialect) -> cuttle::runtime::Result<Self> {
        let dialect_index = dialect.select(&STATS_DIALECTS)?;

        Ok(StatsImpl {
            dialect: &STATS_DIALECTS[dialect_index],
            dialect_index,
        })
    }

    /// The declared dialect this instance is bound to.
    pub fn dialect(&self) -> &'static cuttle::dialect::Dialect {
        self.dialect
    }

    fn count_users_stmt(&self) -> &'static str {
        match self.dialect_index {
            0 => r#"/* Stats:CountUsers */ SELECT COUNT(*) FROM users"#,
            _ => unreachable!("dialect index is checked by StatsImpl::new"),
        }
    }
}

impl Stats for StatsImpl {
    fn count_users(&self, tx: &mut dyn cuttle::runtime::RTx) -> cuttle::runtime::Result<StatsCountUsersRow> {
        tx.query_row(self.count_users_stmt(), &[]).and_then(|row| <StatsCountUsersRow as cuttle::runtime::FromRow>::from_row(&row))
    }

    fn count_users_async(&self, tx: &mut dyn cuttle::runtime::AsyncRTx, callback: cuttle::runtime::AsyncHandler<StatsCountUsersRow>) {
        tx.query_row(
            Box::new(move |result: cuttle::runtime::Result<cuttle::runtime::Row>| {
                callback(result.and_then(|row| <StatsCountUsersRow as cuttle::runtime::FromRow>::from_row(&row)))
            }),
            self.count_users_stmt(),
            vec![],
        );
    }
}

pub trait Maintenance {
    fn vacuum(&self, tx: &mut dyn cuttle::runtime::WTx) -> cuttle::runtime::Result<i64>;

    fn vacuum_async(&self, tx: &mut dyn cuttle::runtime::AsyncWTx, callback: cuttle::runtime::AsyncHandler<i64>);
}

static MAINTENANCE_DIALECTS: [cuttle::dialect::Dialect; 2] = [
    cuttle::dialect::POSTGRES,
    cuttle::dialect::SQLITE,
];

#[derive(Debug, Clone, Copy)]
pub struct MaintenanceImpl {
    dialect:       &'static cuttle::dialect::Dialect,
    dialect_index: usize,
}

impl MaintenanceImpl {
    /// Binds the repository to the declared dialect that best serves `dialect`.
    pub fn new(dialect: &cuttle::dialect::Dialect) -> cuttle::runtime::Result<Self> {
        let dialect_index = dialect.select(&MAINTENANCE_DIALECTS)?;

        match dialect_index {
            1 => {},
            _ => return Err(cuttle::runtime::Error::MissingVariant {
                repository: "Maintenance".to_owned(),
                query: "Vacuum".to_owned(),
                dialect: MAINTENANCE_DIALECTS[dialect_index].name.to_owned(),
            }),
        }

        Ok(MaintenanceImpl {
            dialect: &MAINTENANCE_DIALECTS[dialect_index],
            dialect_index,
        })
    }

    /// The declared dialect this instance is bound to.
    pub fn dialect(&self) -> &'static cuttle::dialect::Dialect {
        self.dialect
    }

    fn vacuum_stmt(&self) -> &'static str {
        match self.dialect_index {
            1 => r#"/* Maintenance:Vacuum */ VACUUM"#,
            _ => unreachable!("dialect index is checked by MaintenanceImpl::new"),
        }
    }
}

impl Maintenance for MaintenanceImpl {
    fn vacuum(&self, tx: &mut dyn cuttle::runtime::WTx) -> cuttle::runtime::Result<i64> {
        tx.exec(self.vacuum_stmt(), &[]).map(|exec| exec.rows_affected())
    }

    fn vacuum_async(&self, tx: &mut dyn cuttle::runtime::AsyncWTx, callback: cuttle::runtime::AsyncHandler<i64>) {
        tx.exec(
            Box::new(move |result: cuttle::runtime::Result<cuttle::runtime::Exec>| {
                callback(result.map(|exec| exec.rows_affected()))
            }),
            self.vacuum_stmt(),
            vec![],
        );
    }
}

