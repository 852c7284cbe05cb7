// 分层结构：domain 为纯逻辑，application 负责调度，interfaces 面向外部
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;
