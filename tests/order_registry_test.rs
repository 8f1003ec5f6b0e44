use restaurant_sim::clients::{ActorClient, OrderClient};
use restaurant_sim::framework::{mock::MockClient, FrameworkError};
use restaurant_sim::lifecycle::signal;
use restaurant_sim::model::{DishCategory, Order, OrderCreate, OrderId, OrderStatus};
use restaurant_sim::order_actor::{self, OrderContext, OrderError};

fn soup_for(client: &str) -> OrderCreate {
    OrderCreate {
        client_name: client.to_string(),
        dish_name: "Borscht".to_string(),
        category: DishCategory::Soup,
    }
}

/// Walks an order from `Created` to `Ready` for `waiter`.
async fn make_ready(orders: &OrderClient, client: &str, waiter: &str) -> OrderId {
    let id = orders.place_order(soup_for(client)).await.unwrap();
    orders.accept(id, waiter).await.unwrap();
    orders.start_cooking(id, "Cook-1").await.unwrap();
    orders.finish_cooking(id).await.unwrap();
    id
}

/// Pattern 1: the real registry actor.
#[tokio::test]
async fn test_registry_walks_the_state_machine() {
    let (_control, shift) = signal::channel();
    let (actor, orders) = order_actor::new();
    let handle = tokio::spawn(actor.run(OrderContext::new(shift)));

    let id = orders.place_order(soup_for("Olga Popova")).await.unwrap();
    assert_eq!(id, OrderId(1));

    let order = orders.accept(id, "Waiter-1").await.unwrap();
    assert_eq!(order.status(), OrderStatus::WaitingForCooking);

    let err = orders.finish_cooking(id).await.unwrap_err();
    assert_eq!(
        err,
        OrderError::InvalidTransition {
            id,
            from: OrderStatus::WaitingForCooking,
            to: OrderStatus::Ready,
        }
    );

    orders.start_cooking(id, "Cook-1").await.unwrap();
    orders.finish_cooking(id).await.unwrap();
    assert_eq!(orders.ready_count().await.unwrap(), 1);

    let claimed = orders.claim_ready("Waiter-1").await.unwrap().unwrap();
    assert_eq!(claimed.id, id);
    assert_eq!(claimed.claimed_by(), Some("Waiter-1"));
    let delivered = orders.deliver(id).await.unwrap();
    assert_eq!(delivered.status(), OrderStatus::Delivered);

    let stored = orders.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status(), OrderStatus::Delivered);
    assert_eq!(orders.ready_count().await.unwrap(), 0);

    assert_eq!(
        orders.deliver(OrderId(99)).await.unwrap_err(),
        OrderError::NotFound("order_99".to_string())
    );

    drop(orders);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_claim_ready_only_returns_own_orders_oldest_first() {
    let (_control, shift) = signal::channel();
    let (actor, orders) = order_actor::new();
    tokio::spawn(actor.run(OrderContext::new(shift)));

    let first = make_ready(&orders, "Anna Kozlova", "Waiter-1").await;
    let other = make_ready(&orders, "Pavel Novikov", "Waiter-2").await;
    let second = make_ready(&orders, "Sergei Lebedev", "Waiter-1").await;

    let a = orders.claim_ready("Waiter-1").await.unwrap().unwrap();
    let b = orders.claim_ready("Waiter-1").await.unwrap().unwrap();
    assert_eq!((a.id, b.id), (first, second));
    assert!(orders.claim_ready("Waiter-1").await.unwrap().is_none());

    let theirs = orders.claim_ready("Waiter-2").await.unwrap().unwrap();
    assert_eq!(theirs.id, other);
}

#[tokio::test]
async fn test_concurrent_claims_deliver_each_order_once() {
    let (_control, shift) = signal::channel();
    let (actor, orders) = order_actor::new();
    tokio::spawn(actor.run(OrderContext::new(shift)));

    let id = make_ready(&orders, "Maria Petrova", "Waiter-1").await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let orders = orders.clone();
        tasks.push(tokio::spawn(async move {
            orders.claim_ready("Waiter-1").await.unwrap()
        }));
    }

    let mut winners = 0;
    for task in tasks {
        if let Some(order) = task.await.unwrap() {
            assert_eq!(order.id, id);
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    assert!(matches!(
        orders.claim(id, "Waiter-1").await,
        Err(OrderError::AlreadyClaimed { .. })
    ));
}

#[tokio::test]
async fn test_list_and_clear() {
    let (_control, shift) = signal::channel();
    let (actor, orders) = order_actor::new();
    tokio::spawn(actor.run(OrderContext::new(shift)));

    for client in ["A", "B", "C"] {
        orders.place_order(soup_for(client)).await.unwrap();
    }
    let all: Vec<Order> = orders.list_all().await.unwrap();
    let clients: Vec<&str> = all.iter().map(|o| o.client_name.as_str()).collect();
    assert_eq!(clients, vec!["A", "B", "C"]);

    assert_eq!(orders.clear().await.unwrap(), 3);
    assert!(orders.list_all().await.unwrap().is_empty());
}

/// Pattern 2: a scripted mock in place of the actor, to pin down error mapping.
#[tokio::test]
async fn test_entity_errors_come_back_typed() {
    let mut mock = MockClient::<Order>::new();
    mock.expect_action(OrderId(3))
        .return_err(FrameworkError::EntityError(Box::new(OrderError::NotReady {
            id: OrderId(3),
            status: OrderStatus::Cooking,
        })));
    mock.expect_action(OrderId(4))
        .return_err(FrameworkError::NotFound("order_4".to_string()));
    mock.expect_action_first()
        .return_err(FrameworkError::ActorDropped);

    let orders = OrderClient::new(mock.client());

    assert_eq!(
        orders.claim(OrderId(3), "Waiter-1").await.unwrap_err(),
        OrderError::NotReady {
            id: OrderId(3),
            status: OrderStatus::Cooking,
        }
    );
    assert_eq!(
        orders.deliver(OrderId(4)).await.unwrap_err(),
        OrderError::NotFound("order_4".to_string())
    );
    assert!(matches!(
        orders.claim_ready("Waiter-1").await,
        Err(OrderError::ActorCommunicationError(_))
    ));

    mock.verify();
}

#[tokio::test]
async fn test_mock_answers_creates_and_counts() {
    let mut mock = MockClient::<Order>::new();
    mock.expect_create().return_ok(OrderId(42));
    mock.expect_count().return_ok(7);

    let orders = OrderClient::new(mock.client());
    assert_eq!(orders.place_order(soup_for("Guest")).await.unwrap(), OrderId(42));
    assert_eq!(orders.ready_count().await.unwrap(), 7);

    mock.verify();
}
