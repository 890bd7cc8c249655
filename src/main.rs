// 分类目录 - 控制台入口

fn main() -> anyhow::Result<()> {
    stamp_catalog_lib::run()
}
