//! End-to-end compositions through the public API.

use ixrender::container::HealthTest;
use ixrender::{ErrorKind, PortProtocol, PortSpec, PortalOverrides, RenderError};
use ixrender_test_utils::{render, render_with, values_with};
use serde_json::json;
use sha2::{Digest, Sha256};

#[test]
fn test_config_content_is_escaped() {
    let mut render = render();
    render
        .add_container("test_container", "image")
        .unwrap()
        .configs
        .add("test_config", "$test_data", "/some/path", None)
        .unwrap();

    let output = render.render().unwrap();
    assert_eq!(output.configs["test_config"].content, "$$test_data");

    let service = serde_json::to_value(&output.services["test_container"]).unwrap();
    assert_eq!(
        service["configs"],
        json!([{"source": "test_config", "target": "/some/path"}])
    );
}

#[test]
fn test_build_image() {
    let mut render = render();
    render
        .add_container("test_container", "image")
        .unwrap()
        .image
        .build_image([
            Some("RUN echo hello"),
            None,
            Some(""),
            Some("RUN echo world"),
        ])
        .unwrap();

    let output = render.render().unwrap();
    let service = &output.services["test_container"];

    let dockerfile = "FROM nginx:latest\nRUN echo hello\nRUN echo world\n";
    let reference = format!(
        "ix-nginx:latest_{}",
        hex::encode(Sha256::digest(dockerfile.as_bytes()))
    );
    let build = service.build.as_ref().unwrap();
    assert_eq!(build.dockerfile_inline, dockerfile);
    assert_eq!(build.tags, vec![reference.clone()]);
    assert_eq!(service.image, reference);
}

#[test]
fn test_host_network_drops_expose() {
    let mut render = render_with(values_with(json!({"network": {"host_network": true}})));
    render
        .add_container("test_container", "image")
        .unwrap()
        .expose
        .add_port(8080, PortProtocol::Tcp)
        .unwrap();

    let output = render.render().unwrap();
    let service = serde_json::to_value(&output.services["test_container"]).unwrap();
    assert_eq!(service["network_mode"], "host");
    assert!(service.get("expose").is_none());
    assert!(service.get("ports").is_none());
}

#[test]
fn test_empty_composition() {
    let err = render().render().unwrap_err();
    assert!(matches!(err, RenderError::EmptyComposition));
    assert_eq!(err.kind(), ErrorKind::Composition);
}

#[test]
fn test_full_document() {
    let mut render = render_with(values_with(json!({
        "network": {"dns_nameservers": ["1.1.1.1"]},
        "labels": [{"key": "team", "value": "media", "containers": ["web", "db"]}],
        "resources": {"limits": {"cpus": 2.0, "memory": 1024}},
        "notes": "Log in as $ADMIN"
    })));

    {
        let db = render.add_container("db", "db").unwrap();
        db.healthcheck
            .set_test(HealthTest::Postgres {
                port: 5432,
                user: "app".into(),
                database: "app".into(),
            })
            .unwrap();
        db.environment.add_env("POSTGRES_PASSWORD", "pa$$").unwrap();
        db.storage.add_named_volume("pgdata", "/var/lib/postgresql/data", false).unwrap();
        db.set_user(999, 999);
    }
    {
        let web = render.add_container("web", "image").unwrap();
        web.depends_on.add_dependency("db", "service_healthy").unwrap();
        web.add_port(&PortSpec::published(8080), Some(80), PortProtocol::Tcp)
            .unwrap();
        web.extra_hosts.add_host("host.docker.internal", "host-gateway").unwrap();
        web.restart.set_policy("on-failure", Some(3)).unwrap();
        web.add_cap("NET_BIND_SERVICE").unwrap();
    }
    render
        .portals_mut()
        .add(&PortSpec::published(8080), PortalOverrides::default())
        .unwrap();

    let output = serde_json::to_value(render.render().unwrap()).unwrap();

    let db = &output["services"]["db"];
    assert_eq!(db["image"], "postgres:17");
    assert_eq!(db["user"], "999:999");
    assert_eq!(db["environment"]["POSTGRES_PASSWORD"], "pa$$$$");
    assert_eq!(db["labels"]["team"], "media");
    assert_eq!(db["dns"], json!(["1.1.1.1"]));
    assert_eq!(db["deploy"]["resources"]["limits"], json!({"cpus": "2", "memory": "1024M"}));
    assert_eq!(db["healthcheck"]["retries"], 5);
    assert_eq!(
        db["volumes"],
        json!([{
            "type": "volume",
            "source": "pgdata",
            "target": "/var/lib/postgresql/data",
            "read_only": false
        }])
    );

    let web = &output["services"]["web"];
    assert_eq!(web["restart"], "on-failure:3");
    assert_eq!(web["depends_on"], json!({"db": {"condition": "service_healthy"}}));
    assert_eq!(web["extra_hosts"], json!({"host.docker.internal": "host-gateway"}));
    assert_eq!(web["cap_drop"], json!(["ALL"]));
    assert_eq!(web["cap_add"], json!(["NET_BIND_SERVICE"]));
    assert_eq!(web["security_opt"], json!(["no-new-privileges=true"]));
    assert_eq!(web["platform"], "linux/amd64");
    assert_eq!(web["ports"].as_array().unwrap().len(), 2);
    assert!(web.get("healthcheck").is_none());

    assert_eq!(output["volumes"], json!({"pgdata": {}}));
    assert_eq!(
        output["x-portals"],
        json!([{"name": "Web UI", "scheme": "http", "host": "0.0.0.0", "port": 8080, "path": "/"}])
    );
    assert_eq!(output["x-notes"], "Log in as $$ADMIN");
    assert_eq!(output["configs"], json!({}));
}

#[test]
fn test_no_portals_renders_empty_list() {
    let mut render = render();
    render.add_container("web", "image").unwrap();
    let output = serde_json::to_value(render.render().unwrap()).unwrap();
    assert_eq!(output["x-portals"], json!([]));
    assert!(output.get("x-notes").is_none());
    assert!(output.get("volumes").is_none());
}
