//! Test helpers for lbsync integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use lbsync::clients::{
    ClientError, ClientResult, ControlPlane, CreateLoadBalancerRequest, IpAddress, LoadBalancer,
    UpdateLoadBalancerRequest, WorkRequest,
};
use lbsync::schema;
use lbsync::{
    LifecycleState, LoadBalancerReconciler, ReconcilerConfig, ResourceData, WorkRequestState,
};

pub const WR_CREATE: &str = "ocid1.loadbalancerworkrequest.1";
pub const WR_DELETE: &str = "ocid1.loadbalancerworkrequest.2";
pub const WR_UPDATE: &str = "ocid1.loadbalancerworkrequest.3";
pub const LB: &str = "ocid1.loadbalancer.1";

/// Canned replies for one client method. Once drained, the last reply
/// repeats.
struct Replies<T> {
    queue: VecDeque<ClientResult<T>>,
    last: Option<ClientResult<T>>,
    calls: usize,
}

impl<T> Default for Replies<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            last: None,
            calls: 0,
        }
    }
}

impl<T: Clone> Replies<T> {
    fn next(&mut self, method: &str) -> ClientResult<T> {
        self.calls += 1;
        if let Some(reply) = self.queue.pop_front() {
            self.last = Some(reply.clone());
            return reply;
        }
        self.last.clone().unwrap_or_else(|| {
            Err(ClientError::Transport(format!("no reply scripted for {method}")))
        })
    }
}

#[derive(Default)]
struct Script {
    create: Replies<String>,
    update: Replies<String>,
    delete: Replies<String>,
    load_balancers: Replies<LoadBalancer>,
    work_requests: Replies<WorkRequest>,
}

/// Number of calls made per client method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub get_load_balancer: usize,
    pub get_work_request: usize,
}

/// Control plane that replays scripted responses.
#[derive(Default)]
pub struct ScriptedControlPlane {
    script: Mutex<Script>,
}

impl ScriptedControlPlane {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_create(&self, reply: ClientResult<String>) -> &Self {
        self.script.lock().unwrap().create.queue.push_back(reply);
        self
    }

    pub fn on_update(&self, reply: ClientResult<String>) -> &Self {
        self.script.lock().unwrap().update.queue.push_back(reply);
        self
    }

    pub fn on_delete(&self, reply: ClientResult<String>) -> &Self {
        self.script.lock().unwrap().delete.queue.push_back(reply);
        self
    }

    pub fn on_get_load_balancer(&self, reply: ClientResult<LoadBalancer>) -> &Self {
        self.script.lock().unwrap().load_balancers.queue.push_back(reply);
        self
    }

    pub fn on_get_work_request(&self, reply: ClientResult<WorkRequest>) -> &Self {
        self.script.lock().unwrap().work_requests.queue.push_back(reply);
        self
    }

    pub fn calls(&self) -> Calls {
        let s = self.script.lock().unwrap();
        Calls {
            create: s.create.calls,
            update: s.update.calls,
            delete: s.delete.calls,
            get_load_balancer: s.load_balancers.calls,
            get_work_request: s.work_requests.calls,
        }
    }
}

#[async_trait]
impl ControlPlane for ScriptedControlPlane {
    async fn create_load_balancer(&self, _req: CreateLoadBalancerRequest) -> ClientResult<String> {
        self.script.lock().unwrap().create.next("create_load_balancer")
    }

    async fn update_load_balancer(
        &self,
        _id: &str,
        _req: UpdateLoadBalancerRequest,
    ) -> ClientResult<String> {
        self.script.lock().unwrap().update.next("update_load_balancer")
    }

    async fn delete_load_balancer(&self, _id: &str) -> ClientResult<String> {
        self.script.lock().unwrap().delete.next("delete_load_balancer")
    }

    async fn get_load_balancer(&self, _id: &str) -> ClientResult<LoadBalancer> {
        self.script.lock().unwrap().load_balancers.next("get_load_balancer")
    }

    async fn get_work_request(&self, _id: &str) -> ClientResult<WorkRequest> {
        self.script.lock().unwrap().work_requests.next("get_work_request")
    }
}

pub fn work_request(id: &str, state: WorkRequestState, lb: &str) -> ClientResult<WorkRequest> {
    Ok(WorkRequest {
        id: id.to_string(),
        state,
        load_balancer_id: lb.to_string(),
        message: None,
    })
}

pub fn load_balancer(state: LifecycleState) -> ClientResult<LoadBalancer> {
    Ok(LoadBalancer {
        id: LB.to_string(),
        compartment_id: "c1".to_string(),
        display_name: "lb1".to_string(),
        shape: "100Mbps".to_string(),
        subnet_ids: vec!["s1".to_string(), "s2".to_string()],
        ip_addresses: vec![IpAddress {
            ip_address: "10.0.0.2".to_string(),
            is_public: false,
        }],
        state,
        time_created: Utc.with_ymd_and_hms(2017, 3, 14, 9, 26, 53).unwrap(),
    })
}

pub fn not_found() -> ClientError {
    ClientError::NotFound(LB.to_string())
}

/// User input for a fresh load balancer.
pub fn input() -> ResourceData {
    let mut data = ResourceData::default();
    data.set_str(schema::COMPARTMENT_ID, "c1");
    data.set_str(schema::SHAPE, "100Mbps");
    data.set_list(schema::SUBNET_IDS, ["s1", "s2"]);
    data.set_str(schema::DISPLAY_NAME, "lb1");
    data
}

/// Field map of an already provisioned load balancer.
pub fn existing() -> ResourceData {
    let mut data = input();
    data.set_id(LB);
    data.set_str(schema::STATE, "Active");
    data
}

/// Reconciler that polls every millisecond.
pub fn reconciler(plane: Arc<dyn ControlPlane>) -> LoadBalancerReconciler {
    let config = ReconcilerConfig {
        poll_interval: Duration::from_millis(1),
        ..Default::default()
    };
    LoadBalancerReconciler::new(plane, config)
}
