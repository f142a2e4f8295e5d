//! Projection of an observed load balancer into the persisted field map.

use crate::clients::LoadBalancer;
use crate::data::ResourceData;
use crate::schema;

/// Write every tracked field from `resource` into `data`.
///
/// Does nothing (and returns `false`) while no load balancer with a handle
/// has been observed, so an in-flight create cannot blank out the user's
/// inputs.
pub fn materialize(resource: Option<&LoadBalancer>, data: &mut ResourceData) -> bool {
    let Some(lb) = resource.filter(|lb| !lb.id.is_empty()) else {
        return false;
    };

    data.set_id(lb.id.as_str());
    data.set_str(schema::COMPARTMENT_ID, lb.compartment_id.as_str());
    data.set_str(schema::DISPLAY_NAME, lb.display_name.as_str());
    data.set_str(schema::SHAPE, lb.shape.as_str());
    data.set_list(schema::SUBNET_IDS, lb.subnet_ids.iter().cloned());

    // Computed
    data.set_str(schema::ID, lb.id.as_str());
    data.set_str(schema::STATE, lb.state.as_str());
    data.set_str(schema::TIME_CREATED, lb.time_created.to_rfc3339());
    data.set_list(
        schema::IP_ADDRESSES,
        lb.ip_addresses.iter().map(|ip| ip.ip_address.clone()),
    );
    true
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::clients::IpAddress;
    use crate::state::LifecycleState;

    fn load_balancer() -> LoadBalancer {
        LoadBalancer {
            id: "ocid1.loadbalancer.1".to_string(),
            compartment_id: "c1".to_string(),
            display_name: "lb1".to_string(),
            shape: "100Mbps".to_string(),
            subnet_ids: vec!["s2".to_string(), "s1".to_string()],
            ip_addresses: vec![
                IpAddress {
                    ip_address: "203.0.113.7".to_string(),
                    is_public: true,
                },
                IpAddress {
                    ip_address: "10.0.0.2".to_string(),
                    is_public: false,
                },
            ],
            state: LifecycleState::Active,
            time_created: Utc.with_ymd_and_hms(2017, 3, 14, 9, 26, 53).unwrap(),
        }
    }

    fn user_input() -> ResourceData {
        let mut d = ResourceData::default();
        d.set_str(schema::COMPARTMENT_ID, "c1");
        d.set_str(schema::SHAPE, "100Mbps");
        d.set_list(schema::SUBNET_IDS, ["s1", "s2"]);
        d.set_str(schema::DISPLAY_NAME, "lb1");
        d.set_id("ocid1.loadbalancerworkrequest.1");
        d
    }

    #[test]
    fn test_noop_without_resource() {
        let mut d = user_input();
        let before = d.clone();
        assert!(!materialize(None, &mut d));
        assert_eq!(d, before);
    }

    #[test]
    fn test_noop_with_empty_handle() {
        let mut d = user_input();
        let before = d.clone();
        let mut lb = load_balancer();
        lb.id.clear();
        lb.display_name.clear();
        assert!(!materialize(Some(&lb), &mut d));
        assert_eq!(d, before);
    }

    #[test]
    fn test_writes_every_field() {
        let lb = load_balancer();
        let mut d = user_input();
        assert!(materialize(Some(&lb), &mut d));

        assert_eq!(d.id(), "ocid1.loadbalancer.1");
        assert_eq!(d.get_str(schema::ID), Some("ocid1.loadbalancer.1"));
        assert_eq!(d.get_str(schema::COMPARTMENT_ID), Some("c1"));
        assert_eq!(d.get_str(schema::DISPLAY_NAME), Some("lb1"));
        assert_eq!(d.get_str(schema::SHAPE), Some("100Mbps"));
        assert_eq!(d.get_str(schema::STATE), Some("Active"));
        assert_eq!(d.get_str(schema::TIME_CREATED), Some("2017-03-14T09:26:53+00:00"));
        // List order follows the resource, not the prior input.
        assert_eq!(
            d.get_list(schema::SUBNET_IDS),
            Some(&["s2".to_string(), "s1".to_string()][..])
        );
        assert_eq!(
            d.get_list(schema::IP_ADDRESSES),
            Some(&["203.0.113.7".to_string(), "10.0.0.2".to_string()][..])
        );
    }
}
