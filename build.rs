fn main() {
    // 告诉 rustc 我们定义了 windows_subsystem cfg
    println!("cargo::rustc-check-cfg=cfg(windows_subsystem)");

    // 计划任务每分钟启动一次，启用 "no-console" 后不再弹出控制台窗口
    if cfg!(feature = "no-console") {
        println!("cargo:rustc-cfg=windows_subsystem");
    }
}
