//! # Staff Repository
//!
//! Employee roster reads and the two single-statement employee writes.
//! Employees are never updated in place, so there is no update query.

use sqlx::PgPool;
use tracing::{debug, info};

use backoffice_core::{Employee, EmployeeInfo, NewEmployee};

use crate::error::{DbResult, OperationExt};
use crate::rows::{EmployeeInfoRow, EmployeeRow};

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: PgPool) -> Self {
        StaffRepository { pool }
    }

    /// Every employee with the name of their department, if it still exists.
    pub async fn list_employees(&self) -> DbResult<Vec<EmployeeInfo>> {
        let rows: Vec<EmployeeInfoRow> = sqlx::query_as(
            r#"
            SELECT
                e.id,
                e.first_name,
                e.last_name,
                e.middle_name,
                e.position,
                e.salary,
                d.name AS department_name
            FROM Employee AS e
            LEFT JOIN Department AS d ON d.id = e.department_id
            ORDER BY e.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .operation("list_employees")?;

        debug!(count = rows.len(), "Listed employees");
        Ok(rows.into_iter().map(EmployeeInfo::from).collect())
    }

    pub async fn list_by_position(&self, position: &str) -> DbResult<Vec<Employee>> {
        let rows: Vec<EmployeeRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, middle_name, position, salary
            FROM Employee
            WHERE position = $1
            ORDER BY id
            "#,
        )
        .bind(position)
        .fetch_all(&self.pool)
        .await
        .operation("list_employees_by_position")?;

        debug!(position, count = rows.len(), "Listed employees by position");
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    /// Inserts an employee and returns the generated id.
    ///
    /// An unknown `department_id` fails with a foreign key violation.
    pub async fn create(&self, employee: &NewEmployee) -> DbResult<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO Employee (first_name, last_name, middle_name, position, salary, department_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.middle_name)
        .bind(&employee.position)
        .bind(employee.salary)
        .bind(employee.department_id)
        .fetch_one(&self.pool)
        .await
        .operation("create_employee")?;

        info!(id, position = %employee.position, "Employee created");
        Ok(id)
    }

    /// Deletes an employee by id. Zero affected rows is not an error.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM Employee WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .operation("delete_employee")?;

        info!(id, rows = result.rows_affected(), "Employee deleted");
        Ok(())
    }
}
