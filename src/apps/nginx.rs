//! nginx.

use crate::component::{ModuleDef, PathDef, PREFIX_KEY};

use super::AppDefinition;

const PATHS: &[PathDef] = &[
    PathDef {
        key: PREFIX_KEY,
        flag: "--prefix",
        default: None,
    },
    PathDef {
        key: "conf",
        flag: "--conf-path",
        default: Some("etc/nginx.conf"),
    },
    PathDef {
        key: "lock",
        flag: "--lock-path",
        default: Some("var/nginx.lock"),
    },
    PathDef {
        key: "http-log",
        flag: "--http-log-path",
        default: Some("var/log/access_log"),
    },
    PathDef {
        key: "error-log",
        flag: "--error-log-path",
        default: Some("var/log/error_log"),
    },
    PathDef {
        key: "pid",
        flag: "--pid-path",
        default: Some("var/nginx.pid"),
    },
    PathDef {
        key: "sbin",
        flag: "--sbin-path",
        default: Some("sbin/nginx"),
    },
];

const MODULES: &[ModuleDef] = &[
    // Event
    ModuleDef::opt_in("poll", "--with-poll_module"),
    ModuleDef::opt_in("rtsig", "--with-rtsig_module"),
    ModuleDef::suppressed("select", "--without-select_module"),
    // HTTP
    ModuleDef::suppressed("http", "--without-http"),
    ModuleDef::opt_in("http-addition", "--with-http_addition_module"),
    ModuleDef::suppressed("http-auth-basic", "--without-http_auth_basic_module"),
    ModuleDef::suppressed("http-autoindex", "--without-http_autoindex_module"),
    ModuleDef::suppressed("http-browser", "--without-http_browser_module"),
    ModuleDef::suppressed("http-charset", "--without-http_charset_module"),
    ModuleDef::opt_in("http-dav", "--with-http_dav_module"),
    ModuleDef::suppressed("http-empty-gif", "--without-http_empty_gif_module"),
    ModuleDef::suppressed("http-fastcgi", "--without-http_fastcgi_module"),
    ModuleDef::opt_in("http-flv", "--with-http_flv_module"),
    ModuleDef::suppressed("http-geo", "--without-http_geo_module"),
    ModuleDef::suppressed("http-gzip", "--without-http_gzip_module").requiring(&["zlib-dev"]),
    ModuleDef::suppressed("http-limit-zone", "--without-http_limit_zone_module"),
    ModuleDef::suppressed("http-map", "--without-http_map_module"),
    ModuleDef::suppressed("http-memcached", "--without-http_memcached_module"),
    ModuleDef::opt_in("http-perl", "--with-http_perl_module"),
    ModuleDef::suppressed("http-proxy", "--without-http_proxy_module"),
    ModuleDef::opt_in("http-realip", "--with-http_realip_module"),
    ModuleDef::suppressed("http-referer", "--without-http_referer_module"),
    ModuleDef::suppressed("http-rewrite", "--without-http_rewrite_module").requiring(&["pcre-dev"]),
    ModuleDef::suppressed("http-ssi", "--without-http_ssi_module"),
    ModuleDef::opt_in("http-ssl", "--with-http_ssl_module").requiring(&["ssl-dev"]),
    ModuleDef::opt_in("http-stub-status", "--with-http_stub_status_module"),
    ModuleDef::opt_in("http-sub", "--with-http_sub_module"),
    ModuleDef::suppressed(
        "http-upstream-ip-hash",
        "--without-http_upstream_ip_hash_module",
    ),
    ModuleDef::suppressed("http-userid", "--without-http_userid_module"),
    // Mail
    ModuleDef::opt_in("mail", "--with-mail"),
    ModuleDef::opt_in("mail-ssl", "--with-mail_ssl_module").requiring(&["ssl-dev"]),
];

/// The nginx web server.
pub const NGINX: AppDefinition = AppDefinition {
    id: "nginx",
    versions: &[
        "0.5.38", "0.6.39", "0.7.69", "0.8.51", "0.8.52", "0.8.53", "0.8.54", "0.8.55", "1.0.1",
        "1.0.2", "1.0.3", "1.0.4", "1.0.5",
    ],
    source_url: "http://nginx.org/download/nginx-{version}.tar.gz",
    source_dir: "nginx-{version}",
    paths: PATHS,
    modules: MODULES,
    dependencies: &["gcc", "make"],
};
