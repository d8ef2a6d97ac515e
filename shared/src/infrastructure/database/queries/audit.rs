/// Append an audit entry
pub const AUDIT_INSERT: &str = r#"
    INSERT INTO audit_entries (
        id, tenant_id, user_id, event_type, resource_type, resource_id,
        outcome, ip_address, user_agent, extras, created_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
"#;

/// Recent entries for a tenant
pub const AUDIT_RECENT_FOR_TENANT: &str = r#"
    SELECT id, tenant_id, user_id, event_type, resource_type, resource_id,
           outcome, ip_address, user_agent, extras, created_at
    FROM audit_entries
    WHERE tenant_id = $1
    ORDER BY created_at DESC
    LIMIT $2
"#;
