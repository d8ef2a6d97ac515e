use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use shared::domain::entities::Role;
use shared::{AppError, AppResult};
use uuid::Uuid;

/// Reject a parent edge that would close a cycle in the tenant's role
/// hierarchy. The hierarchy with the candidate edge added must stay a DAG.
pub fn ensure_acyclic(roles: &[Role], child: Uuid, parent: Uuid) -> AppResult<()> {
    if child == parent {
        return Err(AppError::Validation(
            "a role cannot be its own parent".to_string(),
        ));
    }

    let mut graph: DiGraphMap<Uuid, ()> = DiGraphMap::new();
    for role in roles {
        if role.id == child {
            // The edge under consideration replaces this role's current one.
            continue;
        }
        if let Some(existing_parent) = role.parent_role_id {
            graph.add_edge(role.id, existing_parent, ());
        }
    }
    graph.add_edge(child, parent, ());

    if is_cyclic_directed(&graph) {
        return Err(AppError::Validation(
            "role hierarchy would contain a cycle".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(tenant: Uuid, name: &str, parent: Option<Uuid>) -> Role {
        Role::new(tenant, name.to_string(), None, parent)
    }

    #[test]
    fn chain_is_fine() {
        let tenant = Uuid::new_v4();
        let a = role(tenant, "a", None);
        let b = role(tenant, "b", Some(a.id));
        let c = role(tenant, "c", None);
        let roles = vec![a, b.clone(), c.clone()];
        assert!(ensure_acyclic(&roles, c.id, b.id).is_ok());
    }

    #[test]
    fn self_parent_is_rejected() {
        let tenant = Uuid::new_v4();
        let a = role(tenant, "a", None);
        assert!(ensure_acyclic(&[a.clone()], a.id, a.id).is_err());
    }

    #[test]
    fn closing_a_cycle_is_rejected() {
        let tenant = Uuid::new_v4();
        let a = role(tenant, "a", None);
        let b = role(tenant, "b", Some(a.id));
        let c = role(tenant, "c", Some(b.id));
        let roles = vec![a.clone(), b, c.clone()];
        // a -> c would close a <- b <- c.
        assert!(ensure_acyclic(&roles, a.id, c.id).is_err());
    }

    #[test]
    fn reparenting_breaks_no_cycle_through_the_old_edge() {
        let tenant = Uuid::new_v4();
        let a = role(tenant, "a", None);
        let b = role(tenant, "b", Some(a.id));
        let roles = vec![a.clone(), b.clone()];
        // Moving b under a different root is fine even though b already has
        // a parent edge.
        let c = role(tenant, "c", None);
        let mut roles_with_c = roles.clone();
        roles_with_c.push(c.clone());
        assert!(ensure_acyclic(&roles_with_c, b.id, c.id).is_ok());
    }
}
