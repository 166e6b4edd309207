//! Role and permission lookups.
//!
//! A user's effective permissions are the union of the permissions owned by
//! every role assigned to them, resolved in one join so callers always see
//! the current state of the store.

use super::models::{Permission, Role, RoleWithPermissions};
use sqlx::sqlite::SqliteExecutor;
use sqlx::{query, query_as, query_scalar, FromRow};
use std::collections::BTreeMap;

pub struct RoleRepository;

#[derive(FromRow)]
struct RolePermissionRow {
    role_id: i64,
    role_name: String,
    permission_id: Option<i64>,
    permission_name: Option<String>,
}

impl RoleRepository {
    pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Role>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, Role>("SELECT id, name FROM roles WHERE name = ?")
            .bind(name)
            .fetch_optional(executor)
            .await
    }

    /// Names of the roles assigned to a user, alphabetically.
    pub async fn role_names_for_user<'e, E>(
        executor: E,
        user_id: i64,
    ) -> Result<Vec<String>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = ?
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Flattened permission names across all of a user's roles.
    pub async fn permission_names_for_user<'e, E>(
        executor: E,
        user_id: i64,
    ) -> Result<Vec<String>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_scalar(
            r#"
            SELECT DISTINCT p.name
            FROM permissions p
            JOIN user_roles ur ON ur.role_id = p.role_id
            WHERE ur.user_id = ?
            ORDER BY p.name
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Every role of a user together with the permissions it owns.
    ///
    /// Roles without permissions are still returned, with an empty list.
    pub async fn roles_with_permissions_for_user<'e, E>(
        executor: E,
        user_id: i64,
    ) -> Result<Vec<RoleWithPermissions>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = query_as::<_, RolePermissionRow>(
            r#"
            SELECT r.id AS role_id, r.name AS role_name,
                   p.id AS permission_id, p.name AS permission_name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            LEFT JOIN permissions p ON p.role_id = r.id
            WHERE ur.user_id = ?
            ORDER BY r.name, p.name
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        let mut grouped: BTreeMap<String, RoleWithPermissions> = BTreeMap::new();
        for row in rows {
            let entry = grouped
                .entry(row.role_name.clone())
                .or_insert_with(|| RoleWithPermissions {
                    role: Role {
                        id: row.role_id,
                        name: row.role_name.clone(),
                    },
                    permissions: Vec::new(),
                });
            if let (Some(id), Some(name)) = (row.permission_id, row.permission_name) {
                entry.permissions.push(Permission {
                    id,
                    name,
                    role_id: row.role_id,
                });
            }
        }

        Ok(grouped.into_values().collect())
    }

    /// Assign a role to a user. Returns `false` if it was already assigned.
    pub async fn assign<'e, E>(executor: E, user_id: i64, role_id: i64) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_all_for_user<'e, E>(executor: E, user_id: i64) -> Result<u64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = query("DELETE FROM user_roles WHERE user_id = ?")
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn create_role<'e, E>(executor: E, name: &str) -> Result<Role, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, Role>("INSERT INTO roles (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(executor)
            .await
    }

    /// Attach a new permission to a role. Permission names are globally unique.
    pub async fn add_permission<'e, E>(
        executor: E,
        role_id: i64,
        name: &str,
    ) -> Result<Permission, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, Permission>(
            "INSERT INTO permissions (name, role_id) VALUES (?, ?) RETURNING id, name, role_id",
        )
        .bind(name)
        .bind(role_id)
        .fetch_one(executor)
        .await
    }
}
