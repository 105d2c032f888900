//! Static Flutter/Android project files pushed next to the generated source.
//!
//! Everything here is plain text formatting. The workflow file is the build
//! trigger and is published last by [`crate::publisher`].

pub const MAIN_DART_PATH: &str = "lib/main.dart";
pub const WORKFLOW_PATH: &str = ".github/workflows/build.yml";

const ANDROID_PACKAGE: &str = "com.fabricaapps.app";

/// First three words of the description, used as the display name.
pub fn app_name_from_description(app_description: &str) -> String {
    let name = app_description
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() { "App".to_string() } else { name }
}

/// Dart package identifier: lowercase ASCII, digits and underscores,
/// starting with a letter.
pub fn package_name(app_name: &str) -> String {
    let mut name = String::new();
    for c in app_name.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }
    let name = name.trim_matches('_').to_string();
    match name.chars().next() {
        Some(c) if c.is_ascii_lowercase() => name,
        Some(_) => format!("app_{}", name),
        None => "fabrica_app".to_string(),
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn pubspec(app_name: &str) -> String {
    format!(
        "name: {}
description: App gerado pela Fábrica de Apps
publish_to: 'none'
version: 1.0.0+1

environment:
  sdk: '>=3.0.0 <4.0.0'

dependencies:
  flutter:
    sdk: flutter
  cupertino_icons: ^1.0.6
  shared_preferences: ^2.2.2
  crypto: ^3.0.3

dev_dependencies:
  flutter_test:
    sdk: flutter
  flutter_lints: ^3.0.0

flutter:
  uses-material-design: true
",
        package_name(app_name)
    )
}

pub fn analysis_options() -> &'static str {
    "include: package:flutter_lints/flutter.yaml
"
}

pub fn gitignore() -> &'static str {
    "# Flutter/Dart
.dart_tool/
.flutter-plugins
.flutter-plugins-dependencies
.packages
.pub-cache/
.pub/
build/

# Android
android/.gradle/
android/local.properties
android/captures/
android/app/debug/
android/app/profile/
android/app/release/
*.jks
*.keystore

# IDE
.idea/
.vscode/
*.iml
.DS_Store
"
}

pub fn readme(app_name: &str, app_description: &str, trial_days: u32) -> String {
    format!(
        "# {}

App gerado pela Fábrica de Apps.

{}

Período de trial: {} dias

O APK é compilado automaticamente pelo GitHub Actions a cada push na branch `main`.
Baixe o arquivo na aba **Actions**, em *Artifacts* da execução mais recente.
",
        app_name,
        app_description.trim(),
        trial_days
    )
}

pub fn root_build_gradle() -> &'static str {
    "allprojects {
    repositories {
        google()
        mavenCentral()
    }
}

rootProject.buildDir = '../build'
subprojects {
    project.buildDir = \"${rootProject.buildDir}/${project.name}\"
}
subprojects {
    project.evaluationDependsOn(':app')
}

tasks.register(\"clean\", Delete) {
    delete rootProject.buildDir
}
"
}

pub fn settings_gradle() -> &'static str {
    "pluginManagement {
    def flutterSdkPath = {
        def properties = new Properties()
        file(\"local.properties\").withInputStream { properties.load(it) }
        def flutterSdkPath = properties.getProperty(\"flutter.sdk\")
        assert flutterSdkPath != null, \"flutter.sdk not set in local.properties\"
        return flutterSdkPath
    }()

    includeBuild(\"${flutterSdkPath}/packages/flutter_tools/gradle\")

    repositories {
        google()
        mavenCentral()
        gradlePluginPortal()
    }
}

plugins {
    id \"dev.flutter.flutter-plugin-loader\" version \"1.0.0\"
    id \"com.android.application\" version \"8.1.0\" apply false
    id \"org.jetbrains.kotlin.android\" version \"1.8.22\" apply false
}

include \":app\"
"
}

pub fn gradle_properties() -> &'static str {
    "org.gradle.jvmargs=-Xmx4G
android.useAndroidX=true
android.enableJetifier=true
"
}

pub fn gradle_wrapper_properties() -> &'static str {
    "distributionBase=GRADLE_USER_HOME
distributionPath=wrapper/dists
zipStoreBase=GRADLE_USER_HOME
zipStorePath=wrapper/dists
distributionUrl=https\\://services.gradle.org/distributions/gradle-8.3-all.zip
"
}

pub fn app_build_gradle() -> String {
    format!(
        "plugins {{
    id \"com.android.application\"
    id \"kotlin-android\"
    id \"dev.flutter.flutter-gradle-plugin\"
}}

def localProperties = new Properties()
def localPropertiesFile = rootProject.file('local.properties')
if (localPropertiesFile.exists()) {{
    localPropertiesFile.withReader('UTF-8') {{ reader ->
        localProperties.load(reader)
    }}
}}

def flutterVersionCode = localProperties.getProperty('flutter.versionCode')
if (flutterVersionCode == null) {{
    flutterVersionCode = '1'
}}

def flutterVersionName = localProperties.getProperty('flutter.versionName')
if (flutterVersionName == null) {{
    flutterVersionName = '1.0'
}}

android {{
    namespace \"{package}\"
    compileSdk flutter.compileSdkVersion
    ndkVersion flutter.ndkVersion

    compileOptions {{
        sourceCompatibility JavaVersion.VERSION_1_8
        targetCompatibility JavaVersion.VERSION_1_8
    }}

    kotlinOptions {{
        jvmTarget = '1.8'
    }}

    sourceSets {{
        main.java.srcDirs += 'src/main/kotlin'
    }}

    defaultConfig {{
        applicationId \"{package}\"
        minSdkVersion 21
        targetSdkVersion flutter.targetSdkVersion
        versionCode flutterVersionCode.toInteger()
        versionName flutterVersionName
    }}

    buildTypes {{
        release {{
            signingConfig signingConfigs.debug
        }}
    }}
}}

flutter {{
    source '../..'
}}

dependencies {{}}
",
        package = ANDROID_PACKAGE
    )
}

pub fn android_manifest(app_name: &str) -> String {
    format!(
        "<manifest xmlns:android=\"http://schemas.android.com/apk/res/android\">
    <application
        android:label=\"{}\"
        android:name=\"${{applicationName}}\"
        android:icon=\"@drawable/ic_launcher\">
        <activity
            android:name=\".MainActivity\"
            android:exported=\"true\"
            android:launchMode=\"singleTop\"
            android:taskAffinity=\"\"
            android:theme=\"@style/LaunchTheme\"
            android:configChanges=\"orientation|keyboardHidden|keyboard|screenSize|smallestScreenSize|locale|layoutDirection|fontScale|screenLayout|density|uiMode\"
            android:hardwareAccelerated=\"true\"
            android:windowSoftInputMode=\"adjustResize\">
            <meta-data
              android:name=\"io.flutter.embedding.android.NormalTheme\"
              android:resource=\"@style/NormalTheme\"
              />
            <intent-filter>
                <action android:name=\"android.intent.action.MAIN\"/>
                <category android:name=\"android.intent.category.LAUNCHER\"/>
            </intent-filter>
        </activity>
        <meta-data
            android:name=\"flutterEmbedding\"
            android:value=\"2\" />
    </application>
    <uses-permission android:name=\"android.permission.INTERNET\"/>
</manifest>
",
        xml_escape(app_name)
    )
}

pub fn main_activity_path() -> String {
    format!(
        "android/app/src/main/kotlin/{}/MainActivity.kt",
        ANDROID_PACKAGE.replace('.', "/")
    )
}

pub fn main_activity() -> String {
    format!(
        "package {}

import io.flutter.embedding.android.FlutterActivity

class MainActivity: FlutterActivity() {{
}}
",
        ANDROID_PACKAGE
    )
}

pub fn styles_xml() -> &'static str {
    "<?xml version=\"1.0\" encoding=\"utf-8\"?>
<resources>
    <style name=\"LaunchTheme\" parent=\"@android:style/Theme.Light.NoTitleBar\">
        <item name=\"android:windowBackground\">@drawable/launch_background</item>
    </style>
    <style name=\"NormalTheme\" parent=\"@android:style/Theme.Light.NoTitleBar\">
        <item name=\"android:windowBackground\">?android:colorBackground</item>
    </style>
</resources>
"
}

pub fn launch_background_xml() -> &'static str {
    "<?xml version=\"1.0\" encoding=\"utf-8\"?>
<layer-list xmlns:android=\"http://schemas.android.com/apk/res/android\">
    <item android:drawable=\"@android:color/white\" />
</layer-list>
"
}

pub fn launcher_icon_xml() -> &'static str {
    "<?xml version=\"1.0\" encoding=\"utf-8\"?>
<vector xmlns:android=\"http://schemas.android.com/apk/res/android\"
    android:width=\"48dp\"
    android:height=\"48dp\"
    android:viewportWidth=\"48\"
    android:viewportHeight=\"48\">
    <path
        android:fillColor=\"#1565C0\"
        android:pathData=\"M24,2A22,22 0,1 1,24 46A22,22 0,1 1,24 2Z\" />
    <path
        android:fillColor=\"#FFFFFF\"
        android:pathData=\"M16,13h17v4H21v5h10v4H21v9h-5z\" />
</vector>
"
}

/// GitHub Actions workflow that builds the release APK. Its arrival in the
/// repository starts the first build.
pub fn build_workflow() -> &'static str {
    "name: Build APK

on:
  push:
    branches: [ main ]
  workflow_dispatch:

jobs:
  build:
    runs-on: ubuntu-latest

    steps:
      - uses: actions/checkout@v4

      - uses: actions/setup-java@v4
        with:
          distribution: 'temurin'
          java-version: '17'

      - uses: subosito/flutter-action@v2
        with:
          channel: 'stable'

      - name: Complete platform files
        run: flutter create --platforms=android .

      - name: Install dependencies
        run: flutter pub get

      - name: Build APK
        run: flutter build apk --release

      - uses: actions/upload-artifact@v4
        with:
          name: app-release
          path: build/app/outputs/flutter-apk/app-release.apk
"
}
