//! Client fingerprint scoring.
//!
//! Two independent inputs to the threat score:
//! - suspicious user-agent substrings from a fixed catalogue
//! - headless-automation markers reported by the runtime

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum points contributed by user-agent matches.
pub const MAX_UA_SCORE: u32 = 3;

/// Lower-case substrings that mark scripted, scanning or crawling clients.
pub const SUSPICIOUS_UA_PATTERNS: &[&str] = &[
    "-", "0", "_", "ab/", "acunetix", "ahrefs", "ahrefsbot", "aiohttp", "akamai",
    "androidwebview", "apachebench", "appdynamics", "arachni", "attack", "aws-health",
    "baiduspider", "batch", "batch-download", "beam-us-up", "beautifulsoup", "binaryedge",
    "bingbot", "blazemeter", "blekkobot", "bombardier", "bot", "browserless", "bruteforce",
    "burp", "burpcrawler", "burpsuite", "censys", "cfnetwork", "circleci", "cloud-proxy",
    "cloudflare-diagnostic", "colly", "contact-scraper", "crawl", "crawler", "crawler4j",
    "crawling", "curl", "curl-lite", "curl/", "cypress", "data-miner", "data-scraper",
    "datadog", "datascraper", "detectify", "dirb", "dirbuster", "dirhunt", "dirsearch",
    "discordbot", "domaincrawler", "dotbot", "download", "downloader", "duckduckbot",
    "esp32httpclient", "esp8266httpclient", "exabot", "facebookexternalhit", "fastapi-client",
    "fetch", "fetch/", "ffuf", "fierce", "fierce-scanner", "fileget", "formgrabber",
    "forwarder", "gatling", "github-actions", "gitlab-runner", "go-http", "go-http-client",
    "goquery", "grab", "grabber", "greynoise", "grpc-go", "grpc-java", "headless",
    "headless firefox", "headless-khtml", "headless-shell", "headlesschrome", "heritrix",
    "hey/", "http.rb", "http4s", "httpclient", "httpcomponents", "httpfuzz", "httpie",
    "httprobe", "httptrace", "httpunit", "httpx", "httrack", "insomnia", "intelbot", "java",
    "java-http", "java/", "jenkins", "jsoup", "k6", "libcurl", "libfetch", "libwww",
    "linkdexbot", "linkpadbot", "linkwalker", "linux", "loaderio", "loadtest", "locust",
    "malicious", "maltego", "masscan", "mechanicalsoup", "mechanize", "megaindex",
    "metasploit", "mj12bot", "mojeekbot", "mozilla/4.0 (compatible)",
    "mozilla/5.0 (x11; linux x86_64) applewebkit/537.36", "nagios", "nessus", "netprobe",
    "netsparker", "newrelic", "newspaper", "newspaper3k", "nightwatch", "nikto", "nmap",
    "node-fetch", "null", "objective-c", "okhttp", "okhttp/2", "okhttp/3", "okhttp/4",
    "okhttps", "onpagebot", "openindexspider", "openproxy", "openvas", "oracle-uptime",
    "osint", "osint-scrape", "pagegrabber", "paros", "pattern-extractor", "pentest", "perl",
    "perl/", "phantom", "phantomjs", "php", "php/", "pingdom", "playwright", "powershell",
    "proxy", "proxy-service", "pycurl", "pypeteer", "pyspider", "python", "python-httplib",
    "python-httpx", "python-requests", "python-urllib", "python-urllib3", "python/", "quake",
    "qualys", "qwantbot", "rankactive", "rankranger", "recon", "recon-ng", "reconbot",
    "rest-assured", "restclient", "restsharp", "resttemplate", "retrofit", "reverse-proxy",
    "robotframework", "ruby", "ruby-http", "ruby/", "rust-client", "scanbot", "scanner",
    "screaming frog", "searchmetrics", "semrushbot", "sentrybot", "seo spider", "seoanalyzer",
    "seocheckbot", "seokicks", "serpstat", "seznambot", "shadowbrowser", "shodan", "siege",
    "sistrix", "skipfish", "slimerjs", "sniper", "sogouspider", "spider", "spoof", "sqlmap",
    "sqlninja", "sslscan", "statuscake", "superagent", "supertest", "synthetic", "telegrambot",
    "theharvester", "tls-scan", "tor", "tor-exit", "tor-relay", "torbrowser", "trident",
    "tsung", "twitterbot", "unirest", "unirest-java", "unknown", "uptimerobot", "urlgrabber",
    "urllib", "urllib3", "urlscanner", "vegeta", "vpn", "vpngate", "vscan", "vsdbot",
    "vtprobe", "w3af", "wapiti", "wd/", "webcopier", "webdriver", "webdriverio", "webscraper",
    "wget", "wget-lite", "wget/", "whatweb", "winhttp", "wrk", "x11", "xspider", "yandexbot",
    "yandeximages", "yandexmetrika", "yandexmobile", "zabbix", "zgrab", "zoomeye",
];

lazy_static! {
    /// Automation keywords in the user agent
    static ref HEADLESS_UA_PATTERN: Regex =
        Regex::new(r"(?i)(headless|phantomjs|slimerjs|ghost|electron)").unwrap();
}

/// Runtime-reported client signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFingerprint {
    pub user_agent: String,
    /// `navigator.webdriver`
    pub webdriver: bool,
    /// `None` when the runtime does not expose plugins.
    pub plugin_count: Option<usize>,
    pub language_count: Option<usize>,
    /// A global `chrome` object is present.
    pub has_chrome_object: bool,
}

impl ClientFingerprint {
    pub fn from_user_agent(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            ..Self::default()
        }
    }
}

/// Headless-automation score with the signals that fired.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadlessScore {
    pub score: u32,
    pub signals: Vec<String>,
}

impl HeadlessScore {
    fn add(&mut self, points: u32, signal: &str) {
        self.score += points;
        self.signals.push(signal.to_string());
    }
}

/// Catalogue entries found in the user agent (case-insensitive).
pub fn match_suspicious_user_agent(user_agent: &str) -> Vec<String> {
    let ua_lower = user_agent.to_lowercase();
    SUSPICIOUS_UA_PATTERNS
        .iter()
        .filter(|pattern| ua_lower.contains(*pattern))
        .map(|pattern| pattern.to_string())
        .collect()
}

/// User-agent points, capped at `MAX_UA_SCORE`.
pub fn user_agent_score(matches: &[String]) -> u32 {
    (matches.len() as u32).min(MAX_UA_SCORE)
}

/// Score automation markers; each signal contributes 1 or 2 points.
pub fn detect_headless(fingerprint: &ClientFingerprint) -> HeadlessScore {
    let mut result = HeadlessScore::default();
    let ua_lower = fingerprint.user_agent.to_lowercase();

    if fingerprint.webdriver {
        result.add(2, "navigator.webdriver === true");
    }
    if fingerprint.plugin_count == Some(0) {
        result.add(1, "navigator.plugins.length === 0");
    }
    if fingerprint.language_count == Some(0) {
        result.add(1, "navigator.languages.length === 0");
    }
    if HEADLESS_UA_PATTERN.is_match(&ua_lower) {
        result.add(2, "user agent contains headless-related keyword");
    }
    if fingerprint.has_chrome_object && ua_lower.contains("headlesschrome") {
        result.add(2, "Chrome headless signature");
    }

    result
}
