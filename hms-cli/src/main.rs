//! HMS门户命令行程序
//!
//! 每个子命令挂载一个页面，执行其生命周期，然后在标准输出打印页头和页面。
//! 日志写到标准错误。

mod config;

use crate::config::PortalConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hms_client::HttpApiClient;
use hms_core::{AppointmentStatus, HmsError, Role};
use hms_portal::{
    AddDoctorPage, AppointmentsPage, BillsPage, BookAppointmentPage, DoctorAppointmentsPage,
    DoctorsPage, FetchState, HeaderShell, LoginPage, Navigator, PortalContext, PrescriptionsPage,
    ProfilePage, Render, RequestScope, SubmitState,
};
use hms_session::{FileStorage, SessionContext};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

/// HMS门户命令行参数
#[derive(Parser, Debug)]
#[command(name = "hms-cli")]
#[command(about = "HMS (Hospital Management System) 患者与医生门户")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 打印生效的配置
    Config,
    #[command(flatten)]
    Page(PageCommand),
}

#[derive(Subcommand, Debug)]
enum PageCommand {
    /// 登录（患者或医生）
    Login {
        #[arg(long, default_value = "user")]
        role: Role,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// 登出
    Logout,
    /// 显示当前身份
    Whoami,
    /// 浏览医生目录
    Doctors {
        /// 按姓名或专科过滤
        #[arg(long)]
        search: Option<String>,
    },
    /// 我的预约
    Appointments,
    /// 医生的预约列表
    DoctorAppointments,
    /// 修改预约状态（医生）
    UpdateStatus {
        appointment_id: u64,
        status: AppointmentStatus,
    },
    /// 预约挂号
    Book {
        #[arg(long)]
        doctor: u64,
        /// 日期，YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// 时间，HH:MM
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "")]
        symptoms: String,
    },
    /// 我的处方
    Prescriptions,
    /// 我的账单
    Bills,
    /// 个人资料
    Profile,
    /// 修改个人资料
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// 新增医生
    AddDoctor {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        specialization: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        experience: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(&args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = PortalConfig::load(args.config.as_deref())?;
    match args.command {
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Page(command) => {
            let ctx = build_context(&config).await?;
            run(&ctx, command).await
        }
    }
}

async fn build_context(config: &PortalConfig) -> Result<PortalContext> {
    let storage = FileStorage::open(&config.session.storage_path)
        .await
        .with_context(|| format!("Cannot open session at {}", config.session.storage_path))?;
    let session = SessionContext::load(Arc::new(storage)).await?;
    let api = HttpApiClient::new(config.client_config())?;

    Ok(PortalContext::new(
        Arc::new(api),
        session,
        Navigator::new(),
        config.redirect_delay(),
    ))
}

async fn run(ctx: &PortalContext, command: PageCommand) -> Result<ExitCode> {
    let header = HeaderShell::new(ctx);

    let (view, ok) = match command {
        PageCommand::Login {
            role,
            email,
            password,
        } => {
            let mut page = LoginPage::new(ctx, role);
            page.set_email(email);
            page.set_password(password);
            guarded(page.scope(), page.submit()).await?;
            let ok = submitted(page.state());
            (page.render(), ok)
        }
        PageCommand::Logout => {
            header.logout().await?;
            ("Logged out".to_string(), true)
        }
        PageCommand::Whoami => match ctx.session.identity() {
            Some(identity) => (
                format!(
                    "{} [{}] id={} email={}",
                    identity.display_name(),
                    identity.role,
                    identity.id,
                    identity.email
                ),
                true,
            ),
            None => ("Not logged in".to_string(), false),
        },
        PageCommand::Doctors { search } => {
            let mut page = DoctorsPage::new(ctx);
            guarded(page.scope(), page.mount()).await?;
            if let Some(query) = search {
                page.search(query);
            }
            let ok = loaded(page.state());
            (page.render(), ok)
        }
        PageCommand::Appointments => {
            let mut page = AppointmentsPage::new(ctx);
            guarded(page.scope(), page.mount()).await?;
            let ok = loaded(page.state());
            (page.render(), ok)
        }
        PageCommand::DoctorAppointments => {
            let mut page = DoctorAppointmentsPage::new(ctx);
            guarded(page.scope(), page.mount()).await?;
            let ok = loaded(page.state());
            (page.render(), ok)
        }
        PageCommand::UpdateStatus {
            appointment_id,
            status,
        } => {
            let mut page = DoctorAppointmentsPage::new(ctx);
            guarded(page.scope(), page.mount()).await?;
            if !loaded(page.state()) {
                let view = page.render();
                return Ok(show(&header, ctx, &view, false));
            }
            guarded(page.scope(), page.update_status(appointment_id, status)).await?;
            let ok = submitted(page.update_state());
            (page.render(), ok)
        }
        PageCommand::Book {
            doctor,
            date,
            time,
            symptoms,
        } => {
            let mut page = BookAppointmentPage::new(ctx);
            guarded(page.scope(), page.mount()).await?;
            if !loaded(page.doctors()) {
                let view = page.render();
                return Ok(show(&header, ctx, &view, false));
            }
            let form = page.form_mut();
            form.doctor_id = Some(doctor);
            form.date = date;
            form.time = time;
            form.symptoms = symptoms;
            guarded(page.scope(), page.submit()).await?;
            let ok = submitted(page.state());
            (page.render(), ok)
        }
        PageCommand::Prescriptions => {
            let mut page = PrescriptionsPage::new(ctx);
            guarded(page.scope(), page.mount()).await?;
            let ok = loaded(page.state());
            (page.render(), ok)
        }
        PageCommand::Bills => {
            let mut page = BillsPage::new(ctx);
            guarded(page.scope(), page.mount()).await?;
            let ok = loaded(page.state());
            (page.render(), ok)
        }
        PageCommand::Profile => {
            let mut page = ProfilePage::new(ctx);
            guarded(page.scope(), page.mount()).await?;
            let ok = loaded(page.state());
            (page.render(), ok)
        }
        PageCommand::UpdateProfile {
            name,
            email,
            phone,
            address,
        } => {
            let mut page = ProfilePage::new(ctx);
            guarded(page.scope(), page.mount()).await?;
            if !loaded(page.state()) {
                let view = page.render();
                return Ok(show(&header, ctx, &view, false));
            }
            let form = page.form_mut();
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if phone.is_some() {
                form.phone = phone;
            }
            if address.is_some() {
                form.address = address;
            }
            guarded(page.scope(), page.save()).await?;
            let ok = submitted(page.save_state());
            (page.render(), ok)
        }
        PageCommand::AddDoctor {
            name,
            email,
            password,
            specialization,
            address,
            phone,
            experience,
        } => {
            let mut page = AddDoctorPage::new(ctx);
            let form = page.form_mut();
            form.name = name;
            form.email = email;
            form.password = password;
            form.specialization = specialization;
            form.address = address;
            form.phone = phone;
            form.experience = experience;
            guarded(page.scope(), page.submit()).await?;
            let ok = submitted(page.state());
            (page.render(), ok)
        }
    };

    Ok(show(&header, ctx, &view, ok))
}

/// 在页面作用域内运行，Ctrl-C 取消作用域（相当于页面卸载）
async fn guarded<F>(scope: RequestScope, lifecycle: F) -> Result<()>
where
    F: std::future::Future<Output = hms_core::Result<()>>,
{
    let canceller = scope.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight request");
            canceller.cancel();
        }
    });

    let result = lifecycle.await;
    watcher.abort();
    match result {
        Err(HmsError::Cancelled) => anyhow::bail!("Interrupted"),
        other => Ok(other?),
    }
}

fn loaded<T>(state: &FetchState<T>) -> bool {
    matches!(state, FetchState::Loaded(_) | FetchState::Empty)
}

fn submitted(state: &SubmitState) -> bool {
    matches!(state, SubmitState::Succeeded(_))
}

fn show(header: &HeaderShell, ctx: &PortalContext, view: &str, ok: bool) -> ExitCode {
    println!("{}", header.render());
    println!();
    println!("{}", view);
    if let Some(route) = ctx.navigator.current() {
        info!("Final route {}", route);
        println!();
        println!("-> {}", route);
    }
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
