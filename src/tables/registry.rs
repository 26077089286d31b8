//! Built-in table definitions
//!
//! One definition per provider resource. Columns are a representative set of
//! each resource's fields; anything nested stays a JSON column.

use super::types::{Column, GetConfig, ListConfig, OwnerFilter, ParentConfig, Table, Transform};
use crate::error::{Error, Result};
use crate::types::{ColumnType, Scope};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::types::ColumnType::{Bool, Double, Int, IpAddr, Json, Timestamp};

/// Built-in tables, in registration order
pub static BUILTIN_TABLES: LazyLock<TableRegistry> = LazyLock::new(|| {
    TableRegistry::new(
        [
            instance_server(),
            instance_volume(),
            instance_snapshot(),
            instance_ip(),
            instance_image(),
            instance_security_group(),
            baremetal_server(),
            rdb_instance(),
            rdb_database(),
            kubernetes_cluster(),
            kubernetes_pool(),
            kubernetes_node(),
            registry_namespace(),
            registry_image(),
            object_bucket(),
            vpc_private_network(),
            iam_user(),
            iam_api_key(),
            account_project(),
            account_ssh_key(),
            billing_invoice(),
            billing_consumption(),
        ],
    )
});

/// Get a built-in table by name
pub fn get_builtin(name: &str) -> Option<&'static Table> {
    BUILTIN_TABLES.get(name)
}

/// Names of all built-in tables
pub fn list_builtin() -> Vec<&'static str> {
    BUILTIN_TABLES.names()
}

/// Ordered set of tables addressable by name
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: Vec<Table>,
    index: HashMap<String, usize>,
}

impl TableRegistry {
    /// Build a registry; a later table replaces an earlier one of the same name
    pub fn new(tables: impl IntoIterator<Item = Table>) -> Self {
        let mut registry = Self::default();
        for table in tables {
            registry.insert(table);
        }
        registry
    }

    /// Add or replace a table
    pub fn insert(&mut self, table: Table) {
        if let Some(&pos) = self.index.get(&table.name) {
            self.tables[pos] = table;
        } else {
            self.index.insert(table.name.clone(), self.tables.len());
            self.tables.push(table);
        }
    }

    /// Look up a table
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.index.get(name).map(|&pos| &self.tables[pos])
    }

    /// Look up a table, failing with `TableNotFound`
    pub fn require(&self, name: &str) -> Result<&Table> {
        self.get(name).ok_or_else(|| Error::table_not_found(name))
    }

    /// All tables in registration order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Table names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ============================================================================
// Shared columns
// ============================================================================

fn col(name: &str, ty: ColumnType, description: &str) -> Column {
    Column::new(name, ty, description)
}

fn text(name: &str, description: &str) -> Column {
    Column::new(name, ColumnType::String, description)
}

fn partition_column(scope: Scope) -> Column {
    match scope {
        Scope::Zone => text("zone", "The zone in which the resource is located.").from_partition("zone"),
        _ => text("region", "The region in which the resource is located.")
            .from_partition("region"),
    }
}

/// `project` and `organization` columns, read from the given item fields
fn owner_columns(project_field: &str, organization_field: &str) -> [Column; 2] {
    [
        text("project", "The ID of the project the resource belongs to.").from_field(project_field),
        text("organization", "The ID of the organization the resource belongs to.")
            .from_field(organization_field),
    ]
}

fn title(field: &str) -> Column {
    text("title", "Title of the resource.").from_field(field)
}

// ============================================================================
// Instance
// ============================================================================

fn instance_server() -> Table {
    Table::new(
        "scaleway_instance_server",
        "A Scaleway instance is a virtual machine in the cloud.",
        Scope::Zone,
        ListConfig::new("/instance/v1/zones/{zone}/servers", "servers")
            .per_page()
            .with_key_columns(&["name", "commercial_type"]),
    )
    .with_get(GetConfig::new("/instance/v1/zones/{zone}/servers/{id}", &["id"]).unwrap("server"))
    .with_columns([
        text("name", "The user-defined name of the server."),
        text("id", "An unique identifier of the server."),
        text("state", "The current state of the server."),
        col("creation_date", Timestamp, "The time when the server was created."),
        text("arch", "The architecture of the server."),
        text("boot_type", "The boot type of the server."),
        text("commercial_type", "The commercial type of the server."),
        col("dynamic_ip_required", Bool, "Whether a dynamic IP is required."),
        text("hostname", "The host name of the server."),
        col("protected", Bool, "Whether the server is protected."),
        col("private_ip", IpAddr, "The private IP address of the server."),
        col("modification_date", Timestamp, "The time when the server was last modified."),
        text("state_detail", "Detailed information about the server state."),
        col("image", Json, "The image used by the server."),
        col("public_ip", Json, "The public IP attached to the server."),
        col("volumes", Json, "The volumes attached to the server."),
        col("security_group", Json, "The security group of the server."),
        col("placement_group", Json, "The placement group of the server."),
        col("private_nics", Json, "The private NICs of the server."),
        col("tags", Json, "A list of tags attached to the server."),
        partition_column(Scope::Zone),
    ])
    .with_columns(owner_columns("project", "organization"))
    .with_columns([title("name")])
}

fn instance_volume() -> Table {
    Table::new(
        "scaleway_instance_volume",
        "A volume is where you store your data inside your instance.",
        Scope::Zone,
        ListConfig::new("/instance/v1/zones/{zone}/volumes", "volumes")
            .per_page()
            .with_key_columns(&["name"]),
    )
    .with_get(GetConfig::new("/instance/v1/zones/{zone}/volumes/{id}", &["id"]).unwrap("volume"))
    .with_columns([
        text("name", "The user-defined name of the volume."),
        text("id", "An unique identifier of the volume."),
        text("state", "The current state of the volume."),
        col("size", Int, "The size of the volume in bytes."),
        text("volume_type", "The type of the volume."),
        col("creation_date", Timestamp, "The time when the volume was created."),
        col("modification_date", Timestamp, "The time when the volume was last modified."),
        text("export_uri", "The export URI of the volume."),
        col("server", Json, "The server the volume is attached to."),
        col("tags", Json, "A list of tags attached to the volume."),
        partition_column(Scope::Zone),
    ])
    .with_columns(owner_columns("project", "organization"))
    .with_columns([title("name")])
}

fn instance_snapshot() -> Table {
    Table::new(
        "scaleway_instance_snapshot",
        "A snapshot takes a point in time copy of a volume.",
        Scope::Zone,
        ListConfig::new("/instance/v1/zones/{zone}/snapshots", "snapshots")
            .per_page()
            .with_key_columns(&["name"]),
    )
    .with_get(
        GetConfig::new("/instance/v1/zones/{zone}/snapshots/{id}", &["id"]).unwrap("snapshot"),
    )
    .with_columns([
        text("name", "The user-defined name of the snapshot."),
        text("id", "An unique identifier of the snapshot."),
        text("state", "The current state of the snapshot."),
        col("size", Int, "The size of the snapshot in bytes."),
        text("volume_type", "The type of the snapshotted volume."),
        col("creation_date", Timestamp, "The time when the snapshot was created."),
        col("modification_date", Timestamp, "The time when the snapshot was last modified."),
        col("snapshot_base_volume", Json, "The volume the snapshot was taken from.")
            .from_field("base_volume"),
        partition_column(Scope::Zone),
    ])
    .with_columns(owner_columns("project", "organization"))
    .with_columns([title("name")])
}

fn instance_ip() -> Table {
    Table::new(
        "scaleway_instance_ip",
        "A flexible IP address attachable to an instance.",
        Scope::Zone,
        ListConfig::new("/instance/v1/zones/{zone}/ips", "ips").per_page(),
    )
    .with_get(GetConfig::new("/instance/v1/zones/{zone}/ips/{id}", &["id"]).unwrap("ip"))
    .with_columns([
        text("id", "An unique identifier of the IP."),
        col("address", IpAddr, "The IP address."),
        text("reverse", "The reverse DNS of the IP."),
        col("server", Json, "The server the IP is attached to."),
        col("tags", Json, "A list of tags attached to the IP."),
        partition_column(Scope::Zone),
    ])
    .with_columns(owner_columns("project", "organization"))
    .with_columns([title("address")])
}

fn instance_image() -> Table {
    Table::new(
        "scaleway_instance_image",
        "An image is a backup of an instance.",
        Scope::Zone,
        ListConfig::new("/instance/v1/zones/{zone}/images", "images")
            .per_page()
            .with_key_columns(&["name", "public"]),
    )
    .with_get(GetConfig::new("/instance/v1/zones/{zone}/images/{id}", &["id"]).unwrap("image"))
    .with_columns([
        text("name", "The user-defined name of the image."),
        text("id", "An unique identifier of the image."),
        text("state", "The current state of the image."),
        col("public", Bool, "Whether the image is public."),
        col("creation_date", Timestamp, "The time when the image was created."),
        col("modification_date", Timestamp, "The time when the image was last modified."),
        text("arch", "The architecture of the image."),
        text("from_server", "The server the image was created from."),
        col("root_volume", Json, "The root volume of the image."),
        col("extra_volumes", Json, "Additional volumes of the image."),
        partition_column(Scope::Zone),
    ])
    .with_columns(owner_columns("project", "organization"))
    .with_columns([title("name")])
}

fn instance_security_group() -> Table {
    Table::new(
        "scaleway_instance_security_group",
        "A security group is a set of firewall rules on a set of instances.",
        Scope::Zone,
        ListConfig::new("/instance/v1/zones/{zone}/security_groups", "security_groups")
            .per_page()
            .with_key_columns(&["name"]),
    )
    .with_get(
        GetConfig::new("/instance/v1/zones/{zone}/security_groups/{id}", &["id"])
            .unwrap("security_group"),
    )
    .with_columns([
        text("name", "The name of the security group."),
        text("id", "An unique identifier of the security group."),
        text("description", "The description of the security group."),
        col("project_default", Bool, "Whether this is the project default group."),
        col("organization_default", Bool, "Whether this is the organization default group."),
        col("enable_default_security", Bool, "Whether SMTP is blocked on IPv4 and IPv6."),
        text("inbound_default_policy", "The default inbound policy."),
        text("outbound_default_policy", "The default outbound policy."),
        col("stateful", Bool, "Whether the security group is stateful."),
        col("creation_date", Timestamp, "The time when the group was created."),
        col("modification_date", Timestamp, "The time when the group was last modified."),
        col("servers", Json, "The servers in the security group."),
        partition_column(Scope::Zone),
    ])
    .with_columns(owner_columns("project", "organization"))
    .with_columns([title("name")])
}

// ============================================================================
// Baremetal
// ============================================================================

fn baremetal_server() -> Table {
    Table::new(
        "scaleway_baremetal_server",
        "A dedicated physical server.",
        Scope::Zone,
        ListConfig::new("/baremetal/v1/zones/{zone}/servers", "servers")
            .with_key_columns(&["name"]),
    )
    .with_get(GetConfig::new("/baremetal/v1/zones/{zone}/servers/{id}", &["id"]))
    .with_columns([
        text("name", "The name of the server."),
        text("id", "An unique identifier of the server."),
        text("description", "The description of the server."),
        text("status", "The current status of the server."),
        text("offer_id", "The offer ID of the server."),
        text("offer_name", "The offer name of the server."),
        text("boot_type", "The boot type of the server."),
        text("domain", "The domain of the server."),
        text("ping_status", "The ping status of the server."),
        col("created_at", Timestamp, "The time when the server was created."),
        col("updated_at", Timestamp, "The time when the server was last updated."),
        col("ips", Json, "The IPs of the server."),
        col("install", Json, "The installation details of the server."),
        col("options", Json, "The options of the server."),
        col("rescue_server", Json, "The rescue boot configuration."),
        col("tags", Json, "A list of tags attached to the server."),
        partition_column(Scope::Zone),
    ])
    .with_columns(owner_columns("project_id", "organization_id"))
    .with_columns([title("name")])
}

// ============================================================================
// Managed databases
// ============================================================================

fn rdb_instance() -> Table {
    Table::new(
        "scaleway_rdb_instance",
        "A managed database instance.",
        Scope::Region,
        ListConfig::new("/rdb/v1/regions/{region}/instances", "instances")
            .with_key_columns(&["name"]),
    )
    .with_get(GetConfig::new("/rdb/v1/regions/{region}/instances/{id}", &["id"]))
    .with_columns([
        text("name", "The name of the database instance."),
        text("id", "An unique identifier of the database instance."),
        text("status", "The current status of the database instance."),
        text("engine", "The database engine and version."),
        col("created_at", Timestamp, "The time when the instance was created."),
        col("is_ha_cluster", Bool, "Whether high availability is enabled."),
        text("node_type", "The node type of the database instance."),
        col("backup_schedule", Json, "The backup schedule of the instance."),
        col("endpoints", Json, "The endpoints of the instance."),
        col("init_settings", Json, "The settings set at initialisation."),
        col("read_replicas", Json, "The read replicas of the instance."),
        col("settings", Json, "The advanced settings of the instance."),
        col("volume", Json, "The volume of the instance."),
        col("tags", Json, "A list of tags attached to the instance."),
        partition_column(Scope::Region),
    ])
    .with_columns(owner_columns("project_id", "organization_id"))
    .with_columns([title("name")])
}

fn rdb_database() -> Table {
    Table::new(
        "scaleway_rdb_database",
        "A logical database of a managed database instance.",
        Scope::Region,
        ListConfig::new("/rdb/v1/regions/{region}/instances/{parent}/databases", "databases")
            .with_key_columns(&["name", "owner", "managed"])
            .with_parent(ParentConfig::in_path("scaleway_rdb_instance", "id")),
    )
    .with_columns([
        text("name", "The name of the database."),
        text("instance_id", "The ID of the database instance.").from_partition("parent"),
        col("managed", Bool, "Whether the database is managed."),
        col("size", Int, "The size of the database in bytes."),
        text("owner", "The name of the database owner."),
        partition_column(Scope::Region),
        title("name"),
    ])
}

// ============================================================================
// Kubernetes
// ============================================================================

fn kubernetes_cluster() -> Table {
    Table::new(
        "scaleway_kubernetes_cluster",
        "A managed Kubernetes cluster.",
        Scope::Region,
        ListConfig::new("/k8s/v1/regions/{region}/clusters", "clusters")
            .with_key_columns(&["name", "type", "status"]),
    )
    .with_get(GetConfig::new("/k8s/v1/regions/{region}/clusters/{id}", &["id"]))
    .with_columns([
        text("name", "The name of the cluster."),
        text("id", "An unique identifier of the cluster."),
        text("description", "The description of the cluster."),
        text("status", "The status of the cluster."),
        text("type", "The type of the cluster."),
        text("version", "The Kubernetes version of the cluster."),
        text("cni", "The container network interface of the cluster."),
        text("cluster_url", "The Kubernetes API server URL."),
        text("dns_wildcard", "The DNS wildcard resolving to the ready nodes."),
        col("created_at", Timestamp, "The time when the cluster was created."),
        col("updated_at", Timestamp, "The time when the cluster was last updated."),
        col("autoscaler_config", Json, "The autoscaler configuration."),
        col("auto_upgrade", Json, "The auto upgrade configuration."),
        col("upgrade_available", Bool, "Whether a new Kubernetes version is available."),
        text("feature_gates", "Enabled Kubernetes feature gates.")
            .transformed("feature_gates", Transform::ToString),
        text("admission_plugins", "Enabled admission plugins.")
            .transformed("admission_plugins", Transform::ToString),
        col("open_id_connect_config", Json, "The OpenID Connect configuration."),
        text("apiserver_cert_sans", "Additional SANs of the API server certificate.")
            .transformed("apiserver_cert_sans", Transform::ToString),
        col("tags", Json, "A list of tags attached to the cluster."),
        partition_column(Scope::Region),
    ])
    .with_columns(owner_columns("project_id", "organization_id"))
    .with_columns([title("name")])
}

fn kubernetes_pool() -> Table {
    Table::new(
        "scaleway_kubernetes_pool",
        "A group of nodes with a common configuration in a Kubernetes cluster.",
        Scope::Region,
        ListConfig::new("/k8s/v1/regions/{region}/clusters/{parent}/pools", "pools")
            .with_key_columns(&["name", "status"])
            .with_parent(ParentConfig::in_path("scaleway_kubernetes_cluster", "id")),
    )
    .with_get(GetConfig::new("/k8s/v1/regions/{region}/pools/{id}", &["id"]))
    .with_columns([
        text("name", "The name of the pool."),
        text("id", "An unique identifier of the pool."),
        text("cluster_id", "The ID of the cluster.").from_partition("parent"),
        text("status", "The status of the pool."),
        text("node_type", "The node type of the pool."),
        text("version", "The Kubernetes version of the pool."),
        col("created_at", Timestamp, "The time when the pool was created."),
        col("updated_at", Timestamp, "The time when the pool was last updated."),
        col("autoscaling", Bool, "Whether autoscaling is enabled."),
        col("size", Int, "The number of nodes in the pool."),
        col("min_size", Int, "The minimum size of the pool."),
        col("max_size", Int, "The maximum size of the pool."),
        col("autohealing", Bool, "Whether autohealing is enabled."),
        text("placement_group_id", "The placement group of the pool."),
        col("kubelet_args", Json, "Kubelet arguments of the pool."),
        col("upgrade_policy", Json, "The upgrade policy of the pool."),
        text("root_volume_type", "The root volume type of the nodes."),
        col("root_volume_size", Int, "The root volume size of the nodes in bytes."),
        col("tags", Json, "A list of tags attached to the pool."),
        text("zone", "The zone of the pool nodes."),
        partition_column(Scope::Region),
        title("name"),
    ])
}

fn kubernetes_node() -> Table {
    Table::new(
        "scaleway_kubernetes_node",
        "A machine of a Kubernetes cluster.",
        Scope::Region,
        ListConfig::new("/k8s/v1/regions/{region}/clusters/{parent}/nodes", "nodes")
            .with_key_columns(&["name", "status", "pool_id"])
            .with_parent(ParentConfig::in_path("scaleway_kubernetes_cluster", "id")),
    )
    .with_get(GetConfig::new("/k8s/v1/regions/{region}/nodes/{id}", &["id"]))
    .with_columns([
        text("name", "The name of the node."),
        text("id", "An unique identifier of the node."),
        text("cluster_id", "The ID of the cluster.").from_partition("parent"),
        text("pool_id", "The ID of the pool the node belongs to."),
        text("status", "The status of the node."),
        text("provider_id", "The underlying instance ID."),
        col("public_ip_v4", IpAddr, "The public IPv4 address of the node."),
        col("public_ip_v6", IpAddr, "The public IPv6 address of the node."),
        col("conditions", Json, "The conditions of the node."),
        text("error_message", "Details of the node error, if any."),
        col("created_at", Timestamp, "The time when the node was created."),
        col("updated_at", Timestamp, "The time when the node was last updated."),
        partition_column(Scope::Region),
        title("name"),
    ])
}

// ============================================================================
// Registry
// ============================================================================

fn registry_namespace() -> Table {
    Table::new(
        "scaleway_registry_namespace",
        "A container registry namespace.",
        Scope::Region,
        ListConfig::new("/registry/v1/regions/{region}/namespaces", "namespaces")
            .with_key_columns(&["name"]),
    )
    .with_get(GetConfig::new("/registry/v1/regions/{region}/namespaces/{id}", &["id"]))
    .with_columns([
        text("name", "The name of the namespace."),
        text("id", "An unique identifier of the namespace."),
        text("description", "The description of the namespace."),
        text("status", "The status of the namespace."),
        text("status_message", "Details of the namespace status."),
        text("endpoint", "The endpoint to reach the namespace."),
        col("is_public", Bool, "Whether images are public by default."),
        text("size", "The total size of the namespace in bytes.")
            .transformed("size", Transform::ToString),
        col("image_count", Int, "The number of images in the namespace."),
        col("created_at", Timestamp, "The time when the namespace was created."),
        col("updated_at", Timestamp, "The time when the namespace was last updated."),
        partition_column(Scope::Region),
    ])
    .with_columns(owner_columns("project_id", "organization_id"))
    .with_columns([title("name")])
}

fn registry_image() -> Table {
    Table::new(
        "scaleway_registry_image",
        "A container image in a registry namespace.",
        Scope::Region,
        ListConfig::new("/registry/v1/regions/{region}/images", "images")
            .with_key_columns(&["name"])
            .with_parent(ParentConfig::in_query(
                "scaleway_registry_namespace",
                "id",
                "namespace_id",
            )),
    )
    .with_get(GetConfig::new("/registry/v1/regions/{region}/images/{id}", &["id"]))
    .with_columns([
        text("name", "The name of the image."),
        text("id", "An unique identifier of the image."),
        text("namespace_id", "The ID of the namespace.").from_partition("parent"),
        text("status", "The status of the image."),
        text("visibility", "The visibility of the image."),
        col("size", Int, "The size of the image in bytes."),
        col("created_at", Timestamp, "The time when the image was created."),
        col("updated_at", Timestamp, "The time when the image was last updated."),
        col("tags", Json, "The tags of the image."),
        partition_column(Scope::Region),
        title("name"),
    ])
}

// ============================================================================
// Object Storage
// ============================================================================

fn object_bucket() -> Table {
    Table::new(
        "scaleway_object_bucket",
        "An object storage bucket.",
        Scope::Region,
        ListConfig::object_storage("/", "Buckets.Bucket"),
    )
    .with_columns([
        text("name", "The user-defined name of the bucket.").from_field("Name"),
        col("creation_date", Timestamp, "The time when the bucket was created.")
            .from_field("CreationDate"),
        partition_column(Scope::Region),
        text("project", "The ID of the project the bucket belongs to.").from_field("Project"),
        title("Name"),
    ])
}

// ============================================================================
// VPC
// ============================================================================

fn vpc_private_network() -> Table {
    Table::new(
        "scaleway_vpc_private_network",
        "A private network allows instances to communicate in an isolated network.",
        Scope::Zone,
        ListConfig::new("/vpc/v1/zones/{zone}/private-networks", "private_networks")
            .with_key_columns(&["name"]),
    )
    .with_get(GetConfig::new("/vpc/v1/zones/{zone}/private-networks/{id}", &["id"]))
    .with_columns([
        text("name", "The name of the private network."),
        text("id", "An unique identifier of the private network."),
        col("created_at", Timestamp, "The time when the network was created."),
        col("updated_at", Timestamp, "The time when the network was last updated."),
        col("subnets", Json, "The subnets of the private network."),
        col("tags", Json, "A list of tags attached to the network."),
        partition_column(Scope::Zone),
    ])
    .with_columns(owner_columns("project_id", "organization_id"))
    .with_columns([title("name")])
}

// ============================================================================
// IAM & Account
// ============================================================================

fn iam_user() -> Table {
    Table::new(
        "scaleway_iam_user",
        "A user of the organization.",
        Scope::Global,
        ListConfig::new("/iam/v1alpha1/users", "users").with_owner(OwnerFilter::Organization),
    )
    .with_get(GetConfig::new("/iam/v1alpha1/users/{id}", &["id"]))
    .with_columns([
        text("id", "An unique identifier of the user."),
        text("email", "The email of the user."),
        col("deletable", Bool, "Whether the user can be deleted."),
        col("created_at", Timestamp, "The time when the user was created."),
        col("updated_at", Timestamp, "The time when the user was last updated."),
        col("last_login_at", Timestamp, "The time of the last login."),
        text("type", "The type of the user."),
        col("two_factor_enabled", Bool, "Whether MFA is enabled."),
        text("status", "The status of the user invitation."),
        text("organization", "The ID of the organization.").from_field("organization_id"),
        title("email"),
    ])
}

fn iam_api_key() -> Table {
    Table::new(
        "scaleway_iam_api_key",
        "An API key of the organization.",
        Scope::Global,
        ListConfig::new("/iam/v1alpha1/api-keys", "api_keys")
            .with_key_columns(&["application_id", "user_id"])
            .with_owner(OwnerFilter::Organization),
    )
    .with_get(GetConfig::new("/iam/v1alpha1/api-keys/{access_key}", &["access_key"]))
    .with_columns([
        text("access_key", "The access key of the API key."),
        text("application_id", "The application the key belongs to."),
        text("user_id", "The user the key belongs to."),
        text("description", "The description of the API key."),
        col("created_at", Timestamp, "The time when the key was created."),
        col("updated_at", Timestamp, "The time when the key was last updated."),
        col("expires_at", Timestamp, "The time when the key expires."),
        text("default_project_id", "The default project of the key."),
        col("editable", Bool, "Whether the key can be edited."),
        col("creation_ip", IpAddr, "The IP the key was created from."),
        title("access_key"),
    ])
}

fn account_project() -> Table {
    Table::new(
        "scaleway_account_project",
        "A project of the organization.",
        Scope::Global,
        ListConfig::new("/account/v3/projects", "projects")
            .with_key_columns(&["name"])
            .with_owner(OwnerFilter::Organization),
    )
    .with_get(GetConfig::new("/account/v3/projects/{id}", &["id"]))
    .with_columns([
        text("id", "An unique identifier of the project."),
        text("name", "The name of the project."),
        text("description", "The description of the project."),
        col("created_at", Timestamp, "The time when the project was created."),
        col("updated_at", Timestamp, "The time when the project was last updated."),
        text("organization_id", "The ID of the organization."),
        title("name"),
    ])
}

fn account_ssh_key() -> Table {
    Table::new(
        "scaleway_account_ssh_key",
        "An SSH key registered in the organization.",
        Scope::Global,
        ListConfig::new("/iam/v1alpha1/ssh-keys", "ssh_keys")
            .with_key_columns(&["name"])
            .with_owner(OwnerFilter::Organization),
    )
    .with_get(GetConfig::new("/iam/v1alpha1/ssh-keys/{id}", &["id"]))
    .with_columns([
        text("name", "The name of the SSH key."),
        text("id", "An unique identifier of the SSH key."),
        text("fingerprint", "The fingerprint of the key."),
        text("public_key", "The public key."),
        col("disabled", Bool, "Whether the key is disabled."),
        col("created_at", Timestamp, "The time when the key was created."),
        col("updated_at", Timestamp, "The time when the key was last updated."),
    ])
    .with_columns(owner_columns("project_id", "organization_id"))
    .with_columns([title("name")])
}

// ============================================================================
// Billing
// ============================================================================

fn billing_invoice() -> Table {
    Table::new(
        "scaleway_billing_invoice",
        "An invoice of the organization.",
        Scope::Global,
        ListConfig::new("/billing/v2beta1/invoices", "invoices")
            .with_key_columns(&["invoice_type"])
            .with_owner(OwnerFilter::Organization),
    )
    .with_get(GetConfig::new("/billing/v2beta1/invoices/{id}", &["id"]))
    .with_columns([
        text("id", "An unique identifier of the invoice."),
        text("organization_id", "The ID of the organization."),
        text("organization_name", "The name of the organization."),
        text("invoice_type", "The type of the invoice."),
        text("state", "The state of the invoice."),
        col("number", Int, "The invoice number."),
        text("seller_name", "The name of the seller."),
        col("start_date", Timestamp, "The start of the billed period."),
        col("stop_date", Timestamp, "The end of the billed period."),
        col("billing_period", Timestamp, "The billing period."),
        col("issued_date", Timestamp, "The time when the invoice was issued."),
        col("due_date", Timestamp, "The time when the invoice is due."),
        col("total_untaxed_amount", Double, "The total amount before taxes.")
            .transformed("total_untaxed", Transform::Amount),
        col("total_taxed_amount", Double, "The total amount including taxes.")
            .transformed("total_taxed", Transform::Amount),
        col("total_discount_amount", Double, "The total discount.")
            .transformed("total_discount", Transform::Amount),
        col("total_undiscount_amount", Double, "The total before discount.")
            .transformed("total_undiscount", Transform::Amount),
        text("currency", "The currency of the amounts.")
            .transformed("total_taxed", Transform::Currency),
    ])
}

fn billing_consumption() -> Table {
    Table::new(
        "scaleway_billing_consumption",
        "Consumption of the current billing period, per product.",
        Scope::Global,
        ListConfig::new("/billing/v2beta1/consumptions", "consumptions")
            .unpaginated()
            .with_key_columns(&["project_id", "category_name"])
            .with_owner(OwnerFilter::Organization),
    )
    .with_columns([
        text("category_name", "The category of the consumption."),
        text("product_name", "The product consumed."),
        text("sku", "The stock keeping unit of the product."),
        text("project_id", "The project the consumption belongs to."),
        col("value", Json, "The consumed amount as a money object."),
        col("amount", Double, "The consumed amount.").transformed("value", Transform::Amount),
        text("currency", "The currency of the amount.").transformed("value", Transform::Currency),
        col("billed_quantity", Double, "The billed quantity."),
        text("unit", "The unit of the billed quantity."),
    ])
}
