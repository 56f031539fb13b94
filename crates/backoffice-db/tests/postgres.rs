//! PostgreSQL integration test.
//!
//! Applies `sql/schema.sql` to the database named by `DATABASE_URL`, wipes
//! every table and exercises the writers and nested readers end to end.
//! Ignored by default: point it at a disposable database and run with
//! `--ignored`.

use backoffice_core::{Money, NewReceipt, NewReceiptLine, NewSupplierOrder, NewSupplierOrderLine};
use backoffice_db::{Database, Store};
use sqlx::PgPool;

const SCHEMA: &str = include_str!("../sql/schema.sql");

async fn fresh_database() -> Database {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();

    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();
    sqlx::raw_sql(
        r#"
        TRUNCATE Receipt_Product, Receipt, Supplier_Order_Items, Supplier_Order,
                 Employee, Product, Supplier, Loyalty_Card, Department
        RESTART IDENTITY CASCADE;

        INSERT INTO Department (id, name, location) VALUES (1, 'Grocery', 'Hall A');
        INSERT INTO Product (id, name, price, category, quantity_in_stock, department_id)
        VALUES (1, 'Milk', 700, 'dairy', 40, 1),
               (9, 'Flour', 50, 'bakery', 100, 1);
        INSERT INTO Supplier (id, name) VALUES (5, 'Acme');
        INSERT INTO Loyalty_Card (id, number) VALUES (42, 42);
        INSERT INTO Employee (id, first_name, last_name, middle_name, position, salary, department_id)
        VALUES (1, 'Anna', 'Ivanova', 'S', 'cashier', 1200, 1);
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    Database::from_pool(pool)
}

fn receipt_line(product_id: i64, quantity: i32, price: i64) -> NewReceiptLine {
    NewReceiptLine {
        product_id,
        quantity,
        price: Money::from_units(price),
        amount: Money::from_units(price * i64::from(quantity)),
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at a disposable PostgreSQL database"]
async fn writers_and_nested_readers() {
    let db = fresh_database().await;

    // A failing second line leaves neither header nor first line behind.
    let err = db
        .create_receipt(&NewReceipt {
            loyalty_card_number: Some(0),
            teller_id: 1,
            products: vec![receipt_line(1, 1, 700), receipt_line(99, 1, 10)],
        })
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());
    assert!(err.to_string().contains("insert receipt line 2"));
    assert!(db.full_receipts().await.unwrap().is_empty());

    let without_card = db
        .create_receipt(&NewReceipt {
            loyalty_card_number: Some(0),
            teller_id: 1,
            products: vec![receipt_line(1, 2, 700)],
        })
        .await
        .unwrap();
    let with_card = db
        .create_receipt(&NewReceipt {
            loyalty_card_number: Some(42),
            teller_id: 1,
            products: vec![receipt_line(9, 1, 50), receipt_line(1, 1, 700)],
        })
        .await
        .unwrap();

    let receipts = db.full_receipts().await.unwrap();
    assert_eq!(receipts.len(), 2);
    assert_eq!(receipts[0].id, without_card);
    assert_eq!(receipts[0].loyalty_card_number, None);
    assert_eq!(receipts[0].total, Money::from_units(1400));
    assert_eq!(receipts[0].products[0].name, "Milk");
    assert_eq!(receipts[1].id, with_card);
    assert_eq!(receipts[1].loyalty_card_number, Some(42));
    assert_eq!(receipts[1].products[0].name, "Flour");
    assert_eq!(receipts[1].products[1].name, "Milk");

    let order_id = db
        .create_supplier_order(&NewSupplierOrder {
            supplier_id: 5,
            supplier_order_items: vec![NewSupplierOrderLine {
                price: Money::from_units(50),
                product_id: 9,
                quantity: 3,
            }],
        })
        .await
        .unwrap();

    let orders = db.full_supplier_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order_id);
    assert_eq!(orders[0].date_of_receipt, None);
    assert_eq!(orders[0].supplier_order_items[0].amount, Money::from_units(150));

    let supplied = db.list_products_by_supplier(5).await.unwrap();
    assert_eq!(supplied.len(), 1);
    assert_eq!(supplied[0].id, 9);

    db.close().await;
}
