use crate::actor_framework::Entity;
use crate::domain::Order;
use super::actions::{OrderAction, OrderQuery, StatusUpdate};

impl Entity for Order {
    type Id = String;
    type Query = OrderQuery;
    type Patch = StatusUpdate;
    type Action = OrderAction;

    fn id(&self) -> &String {
        &self.id
    }
}
