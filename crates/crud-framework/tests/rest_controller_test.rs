use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request as HttpRequest, StatusCode};
use crud_framework::persistence::{Entity, StoreActor, WriteOp};
use crud_framework::{
    Authenticated, Bound, Errors, Outcome, Principal, Repository, Request, RestController,
    RestService, ServiceError, TransactionManager,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceExt;

// --- Test Entity ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Task {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    done: bool,
}

impl Task {
    fn new(title: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            done: false,
        }
    }
}

impl Entity for Task {
    type Id = u32;

    fn id(&self) -> Option<u32> {
        self.id
    }

    fn assign_id(&mut self, id: u32) {
        self.id = Some(id);
    }

    fn check_constraints(&self, errors: &mut Errors) {
        errors.not_blank("title", &self.title);
    }
}

// --- Test Service ---

struct TaskService {
    tasks: Repository<Task>,
    open: bool,
    broken: bool,
}

#[async_trait]
impl RestService<Authenticated, Task> for TaskService {
    async fn authorise(&self, request: &Request) -> Result<bool, ServiceError> {
        Ok(self.open || !request.principal().is_anonymous())
    }

    async fn get_all(&self, _request: &Request) -> Result<Vec<Task>, ServiceError> {
        Ok(self.tasks.find_all().await?)
    }

    async fn validate(
        &self,
        _request: &Request,
        task: &Task,
        errors: &mut Errors,
    ) -> Result<(), ServiceError> {
        errors.state(!task.done, "done", "new tasks cannot be done");
        Ok(())
    }

    async fn save(&self, request: &Request, task: &mut Task) -> Result<(), ServiceError> {
        if self.broken {
            return Err(ServiceError::Rejected("disk full".to_string()));
        }
        Ok(self.tasks.save(request.session(), task.clone())?)
    }
}

struct Fixture {
    controller: Arc<RestController<Authenticated, Task>>,
    tasks: Repository<Task>,
    transactions: TransactionManager,
}

fn setup(open: bool, broken: bool) -> Fixture {
    let (actor, tasks) = StoreActor::<Task>::new(16);
    tokio::spawn(actor.run());
    let transactions = TransactionManager::new();
    let service = TaskService {
        tasks: tasks.clone(),
        open,
        broken,
    };
    Fixture {
        controller: Arc::new(RestController::<Authenticated, Task>::new(
            service,
            transactions.clone(),
        )),
        tasks,
        transactions,
    }
}

fn alice() -> Principal {
    Principal::authenticated("alice", Vec::<String>::new())
}

#[tokio::test]
async fn test_list_returns_every_task() {
    let fx = setup(false, false);
    fx.tasks.write(WriteOp::Insert(Task::new("one"))).await.unwrap();
    fx.tasks.write(WriteOp::Insert(Task::new("two"))).await.unwrap();

    let outcome = fx
        .controller
        .handle_request(Bound::empty(), Method::GET, alice(), "en")
        .await;

    let Outcome::Listed(tasks) = outcome else {
        panic!("Expected a listing");
    };
    assert_eq!(tasks.len(), 2);
    let stats = fx.transactions.stats();
    assert_eq!((stats.committed, stats.active), (1, 0));
}

#[tokio::test]
async fn test_valid_post_is_created_and_committed() {
    let fx = setup(false, false);

    let outcome = fx
        .controller
        .handle_request(Bound::from_entity(Task::new("write docs")), Method::POST, alice(), "en")
        .await;

    assert_eq!(outcome.status(), StatusCode::CREATED);
    let stored = fx.tasks.find_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, Some(1));
    assert_eq!(stored[0].title, "write docs");
    assert_eq!(fx.transactions.stats().committed, 1);
}

#[tokio::test]
async fn test_binding_and_business_errors_are_merged() {
    let fx = setup(false, false);
    let bound = Bound::<Task>::from_json(br#"{"title": "   ", "done": true}"#);

    let outcome = fx
        .controller
        .handle_request(bound, Method::POST, alice(), "en")
        .await;

    let Outcome::ValidationFailed(errors) = outcome else {
        panic!("Expected a validation failure");
    };
    let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, ["title", "done"]);
    assert!(fx.tasks.find_all().await.unwrap().is_empty());
    let stats = fx.transactions.stats();
    assert_eq!((stats.committed, stats.rolled_back, stats.active), (0, 1, 0));
}

#[tokio::test]
async fn test_post_without_body_is_a_validation_failure() {
    let fx = setup(false, false);

    let outcome = fx
        .controller
        .handle_request(Bound::empty(), Method::POST, alice(), "en")
        .await;

    let Outcome::ValidationFailed(errors) = outcome else {
        panic!("Expected a validation failure");
    };
    assert!(errors.has_errors_for("body"));
    assert_eq!(errors.len(), 1);
}

#[tokio::test]
async fn test_unauthorised_caller_reads_nothing() {
    let fx = setup(false, false);
    fx.tasks.write(WriteOp::Insert(Task::new("secret"))).await.unwrap();

    let outcome = fx
        .controller
        .handle_request(Bound::empty(), Method::GET, Principal::anonymous(), "en")
        .await;

    assert!(matches!(outcome, Outcome::Unauthorised));
    let stats = fx.transactions.stats();
    assert_eq!((stats.rolled_back, stats.active), (1, 0));
}

#[tokio::test]
async fn test_fault_answers_unauthorised_and_rolls_back() {
    let fx = setup(false, true);

    let outcome = fx
        .controller
        .handle_request(Bound::from_entity(Task::new("doomed")), Method::POST, alice(), "en")
        .await;

    assert_eq!(outcome.status(), StatusCode::UNAUTHORIZED);
    assert!(fx.tasks.find_all().await.unwrap().is_empty());
    assert_eq!(fx.transactions.stats().rolled_back, 1);
}

#[tokio::test]
async fn test_other_verbs_are_not_implemented() {
    let fx = setup(false, false);

    for method in [Method::PUT, Method::DELETE, Method::PATCH] {
        let outcome = fx
            .controller
            .handle_request(Bound::empty(), method, alice(), "en")
            .await;
        assert!(matches!(outcome, Outcome::NotImplemented));
    }
    assert_eq!(fx.transactions.stats().committed, 3);
}

#[tokio::test]
async fn test_sequential_requests_are_isolated() {
    let fx = setup(false, false);

    let failed = fx
        .controller
        .handle_request(Bound::from_entity(Task::new("")), Method::POST, alice(), "en")
        .await;
    let created = fx
        .controller
        .handle_request(Bound::from_entity(Task::new("second")), Method::POST, alice(), "en")
        .await;

    assert!(failed.is_validation_failure());
    assert_eq!(created.status(), StatusCode::CREATED);
    let titles: Vec<_> = fx
        .tasks
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, ["second"]);
    let stats = fx.transactions.stats();
    assert_eq!((stats.begun, stats.committed, stats.rolled_back), (2, 1, 1));
}

#[tokio::test]
async fn test_routes_over_http() {
    let fx = setup(true, false);
    let app: axum::Router = fx.controller.clone().routes("/api/tasks/");

    let created = app
        .clone()
        .oneshot(
            HttpRequest::builder()
                .method(Method::POST)
                .uri("/api/tasks/create")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"title": "ship it"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = to_bytes(created.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Successful creation");

    let listed = app
        .clone()
        .oneshot(HttpRequest::get("/api/tasks/list").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let body = to_bytes(listed.into_body(), usize::MAX).await.unwrap();
    let tasks: Vec<Task> = serde_json::from_slice(&body).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "ship it");

    let malformed = app
        .clone()
        .oneshot(
            HttpRequest::post("/api/tasks/create")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(malformed.status().as_u16(), 203);

    let deleted = app
        .oneshot(HttpRequest::delete("/api/tasks/list").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(fx.transactions.stats().active, 0);
}

#[tokio::test]
async fn test_failed_commit_is_unauthorised() {
    let (actor, tasks) = StoreActor::<Task>::new(16);
    drop(actor);
    let transactions = TransactionManager::new();
    let service = TaskService {
        tasks,
        open: false,
        broken: false,
    };
    let controller = RestController::<Authenticated, Task>::new(service, transactions.clone());

    let outcome = controller
        .handle_request(Bound::from_entity(Task::new("lost")), Method::POST, alice(), "en")
        .await;

    assert!(matches!(outcome, Outcome::Unauthorised));
    let stats = transactions.stats();
    assert_eq!((stats.committed, stats.rolled_back, stats.active), (0, 1, 0));
}
